//! Fixtures shared by the integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::Result;
use nwgd::{GribMessage, KeyWrite};

/// Number of points along each axis of the template grid.
pub const N: usize = 21;

/// National template message: 26.10N..25.90N by 109.90E..110.10E at 0.01°,
/// scanned north to south, filled with `value`.
pub fn template_message(forecast_time: i64, value: f64) -> Result<GribMessage> {
    let mut msg = GribMessage::from_sample("regular_ll_sfc_grib2")?;

    msg.write_key("productDefinitionTemplateNumber", 8_i64)?
        .write_key("Ni", N as i64)?
        .write_key("Nj", N as i64)?
        .write_key("numberOfDataPoints", (N * N) as i64)?
        .write_key("jScansPositively", 0_i64)?
        .write_key("latitudeOfFirstGridPointInDegrees", 26.10)?
        .write_key("longitudeOfFirstGridPointInDegrees", 109.90)?
        .write_key("latitudeOfLastGridPointInDegrees", 25.90)?
        .write_key("longitudeOfLastGridPointInDegrees", 110.10)?
        .write_key("iDirectionIncrementInDegrees", 0.01)?
        .write_key("jDirectionIncrementInDegrees", 0.01)?
        .write_key("forecastTime", forecast_time)?
        .write_key("bitsPerValue", 16_i64)?;

    // a single outlier keeps the field from being packed as constant
    let mut values = vec![value; N * N];
    values[N * N - 1] = value + 1.0;
    msg.write_key("values", values.as_slice())?;

    Ok(msg)
}

/// Writes a national template for `code` with one message per forecast time.
pub fn write_template(dir: &Path, code: &str, forecast_times: &[i64], value: f64) -> Result<PathBuf> {
    let path = dir.join(format!(
        "Z_NWGD_C_BECS_20240319000000_P_OGFP_SPFC-{code}_202403190800_01201.GRB2"
    ));

    for (i, &step) in forecast_times.iter().enumerate() {
        template_message(step, value)?.write_to_file(&path, i > 0)?;
    }

    Ok(path)
}

/// Row of latitude `lat` in the template grid.
pub fn row(lat: f64) -> usize {
    ((26.10 - lat) / 0.01).round() as usize
}

/// Column of longitude `lon` in the template grid.
pub fn col(lon: f64) -> usize {
    ((lon - 109.90) / 0.01).round() as usize
}

/// Writes a GBK-encoded station table.
pub fn write_station_table(path: &Path, table: &str) -> Result<()> {
    let (bytes, _, unmappable) = encoding_rs::GBK.encode(table);
    anyhow::ensure!(!unmappable, "station table is not representable in GBK");
    std::fs::write(path, bytes)?;

    Ok(())
}
