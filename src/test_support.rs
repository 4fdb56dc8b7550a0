//! GRIB fixtures built from the ecCodes sample, shared by unit tests

use std::path::{Path, PathBuf};

use crate::{errors::CodesError, GribMessage, KeyWrite};

/// Template message on a 21x21 grid, 26.10N..25.90N by 109.90E..110.10E at 0.01°,
/// scanned north to south, every value 5.0 except 6.0 in the north-west corner.
/// Uses product definition template 4.8,
/// so the end of the overall time interval keys are defined.
pub fn test_template(forecast_time: i64) -> Result<GribMessage, CodesError> {
    let mut msg = GribMessage::from_sample("regular_ll_sfc_grib2")?;

    msg.write_key("productDefinitionTemplateNumber", 8_i64)?
        .write_key("Ni", 21_i64)?
        .write_key("Nj", 21_i64)?
        .write_key("numberOfDataPoints", 21_i64 * 21)?
        .write_key("jScansPositively", 0_i64)?
        .write_key("latitudeOfFirstGridPointInDegrees", 26.10)?
        .write_key("longitudeOfFirstGridPointInDegrees", 109.90)?
        .write_key("latitudeOfLastGridPointInDegrees", 25.90)?
        .write_key("longitudeOfLastGridPointInDegrees", 110.10)?
        .write_key("iDirectionIncrementInDegrees", 0.01)?
        .write_key("jDirectionIncrementInDegrees", 0.01)?
        .write_key("forecastTime", forecast_time)?
        .write_key("bitsPerValue", 16_i64)?;

    let mut values = vec![5.0; 21 * 21];
    values[0] = 6.0;
    msg.write_key("values", values.as_slice())?;

    Ok(msg)
}

/// Writes one [`test_template`] message per forecast time into `dir/name`.
pub fn write_test_grib(
    dir: &Path,
    name: &str,
    forecast_times: &[i64],
) -> Result<PathBuf, CodesError> {
    let path = dir.join(name);

    for (i, &step) in forecast_times.iter().enumerate() {
        test_template(step)?.write_to_file(&path, i > 0)?;
    }

    Ok(path)
}
