//! Grid rewriting: patching local forecasts into national template messages
//!
//! For each forecast step the matching template message is cloned, the values inside the
//! local extent are overwritten, categorical products are reduced to their two category
//! codes and the issue time keys are rewritten before the message is appended to the output.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use ndarray::{Array1, Array2, ArrayD, ArrayView2};
use tracing::{debug, error, info, instrument};

use crate::{
    errors::{Error, Result},
    grid::{check_data, round_to, Extent, LocalGrid, DEFAULT_DECIMALS, DEFAULT_STEP},
    naming, ForecastVariable, GribFile, GribMessage, KeyRead, KeyWrite,
};

/// Format of the issue time, e.g. `202403192000`.
pub const ISSUE_TIME_FORMAT: &str = "%Y%m%d%H%M";

const INTERVAL_END_KEYS: [&str; 4] = [
    "yearOfEndOfOverallTimeInterval",
    "monthOfEndOfOverallTimeInterval",
    "dayOfEndOfOverallTimeInterval",
    "hourOfEndOfOverallTimeInterval",
];

/// Everything needed to produce one grid product.
#[derive(Clone, Debug)]
pub struct RewriteRequest {
    /// Issue time, `YYYYmmddHHMM`
    pub sdate: String,
    /// Local forecast, `(lat, lon)` or `(step, lat, lon)`
    pub data: ArrayD<f64>,
    pub variable: ForecastVariable,
    pub extent: Extent,
    /// Region code used in the output name
    pub region: String,
    /// Directory holding the national templates
    pub sample_dir: PathBuf,
    /// Directory the product is written to
    pub save_dir: PathBuf,
    /// Expected `name` of the template parameter
    pub check_name: Option<String>,
    /// Template `forecastTime` of every step, defaults to the variable's labels
    pub forecast_times: Option<Vec<i64>>,
    pub step: f64,
    pub decimals: u32,
    /// Output file name, overrides the bulletin naming
    pub save_name: Option<String>,
    /// Template path, overrides the lookup in `sample_dir`
    pub template: Option<PathBuf>,
}

impl RewriteRequest {
    /// Request with default grid spacing and no overrides.
    pub fn new(
        sdate: impl Into<String>,
        data: ArrayD<f64>,
        variable: ForecastVariable,
        extent: Extent,
        region: impl Into<String>,
        sample_dir: impl Into<PathBuf>,
        save_dir: impl Into<PathBuf>,
    ) -> Self {
        RewriteRequest {
            sdate: sdate.into(),
            data,
            variable,
            extent,
            region: region.into(),
            sample_dir: sample_dir.into(),
            save_dir: save_dir.into(),
            check_name: None,
            forecast_times: None,
            step: DEFAULT_STEP,
            decimals: DEFAULT_DECIMALS,
            save_name: None,
            template: None,
        }
    }
}

/// Parses an issue time in `YYYYmmddHHMM` form.
pub fn parse_issue_time(sdate: &str) -> Result<NaiveDateTime> {
    if sdate.len() != 12 || !sdate.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::IssueTime(sdate.to_owned()));
    }

    NaiveDateTime::parse_from_str(sdate, ISSUE_TIME_FORMAT)
        .map_err(|_| Error::IssueTime(sdate.to_owned()))
}

/// End of the overall time interval of step `index`: one day after issue for
/// daily extremes, `index + 1` hours after issue otherwise.
pub fn interval_end(issue: NaiveDateTime, variable: ForecastVariable, index: usize) -> NaiveDateTime {
    if variable.is_daily_extreme() {
        issue + Duration::days(1)
    } else {
        issue + Duration::hours(index as i64 + 1)
    }
}

/// Overwrites the part of `values` covered by the local grid.
///
/// Template rows whose latitude lies within `lat_bounds` and columns whose longitude lies
/// within `lon_bounds` form the patched rectangle. Local values are written positionally,
/// in the template's row and column order.
pub fn patch_region(
    values: &mut Array2<f64>,
    template_lats: &Array1<f64>,
    template_lons: &Array1<f64>,
    local: ArrayView2<'_, f64>,
    lat_bounds: (f64, f64),
    lon_bounds: (f64, f64),
) -> Result<()> {
    let rows: Vec<usize> = within(template_lats, lat_bounds);
    let cols: Vec<usize> = within(template_lons, lon_bounds);
    let (lat, lon) = local.dim();

    if rows.len() != lat || cols.len() != lon {
        return Err(Error::RegionMismatch {
            rows: rows.len(),
            cols: cols.len(),
            lat,
            lon,
        });
    }

    for (li, &row) in rows.iter().enumerate() {
        for (lj, &col) in cols.iter().enumerate() {
            values[[row, col]] = local[[li, lj]];
        }
    }

    Ok(())
}

fn within(axis: &Array1<f64>, (lo, hi): (f64, f64)) -> Vec<usize> {
    axis.iter()
        .enumerate()
        .filter(|(_, &v)| v >= lo && v <= hi)
        .map(|(i, _)| i)
        .collect()
}

/// Reduces a field to two categories: `-1` where `value <= 0`, `code` elsewhere.
pub fn categorize(values: &mut Array2<f64>, code: f64) {
    values.mapv_inplace(|v| if v <= 0.0 { -1.0 } else { code });
}

/// Writes issue date and time, and the end of the overall time interval when the
/// message has a statistical processing section.
pub fn patch_times(
    message: &mut GribMessage,
    issue: NaiveDateTime,
    interval_end: NaiveDateTime,
) -> Result<()> {
    let data_date = i64::from(issue.year()) * 10_000
        + i64::from(issue.month()) * 100
        + i64::from(issue.day());
    let data_time = i64::from(issue.hour()) * 100 + i64::from(issue.minute());

    message
        .write_key("dataDate", data_date)?
        .write_key("dataTime", data_time)?;

    if !message.is_defined(INTERVAL_END_KEYS[0])? {
        debug!("template has no overall time interval, leaving it unset");
        return Ok(());
    }

    let end = [
        i64::from(interval_end.year()),
        i64::from(interval_end.month()),
        i64::from(interval_end.day()),
        i64::from(interval_end.hour()),
    ];

    for (key, value) in INTERVAL_END_KEYS.iter().zip(end) {
        message.write_key(key, value)?;
    }

    Ok(())
}

/// Template message for one step: the first message when the product has a single step,
/// otherwise the first message with given `forecastTime`.
fn select_template(messages: &[GribMessage], single: bool, forecast_time: i64) -> Result<GribMessage> {
    if single {
        let first = messages.first().ok_or(Error::MissingForecastTime(forecast_time))?;
        return Ok(first.try_clone()?);
    }

    for msg in messages {
        let step: i64 = msg.read_key("forecastTime")?;
        if step == forecast_time {
            return Ok(msg.try_clone()?);
        }
    }

    Err(Error::MissingForecastTime(forecast_time))
}

/// Produces the grid product described by `request`, naming it with `now` as the
/// production time. Returns the path of the written file.
///
/// Any failure aborts the whole product: the partially written file is removed
/// and the error returned.
#[instrument(level = "info", skip(request), fields(variable = %request.variable, sdate = %request.sdate))]
pub fn write_grib(request: &RewriteRequest, now: NaiveDateTime) -> Result<PathBuf> {
    let issue = parse_issue_time(&request.sdate)?;

    check_data(
        &request.extent,
        request.data.shape(),
        request.variable,
        request.step,
        request.decimals,
    )?;
    let grid = LocalGrid::new(
        request.data.clone(),
        &request.extent,
        request.step,
        request.decimals,
    )?;

    let template_path = match &request.template {
        Some(path) => path.clone(),
        None => naming::find_template(&request.sample_dir, request.variable)?,
    };
    let save_name = match &request.save_name {
        Some(name) => name.clone(),
        None => naming::grid_file_name(&request.region, now, request.variable, &request.sdate),
    };
    let out_path = request.save_dir.join(save_name);

    let forecast_times = match &request.forecast_times {
        Some(times) if times.len() != grid.steps() => {
            return Err(Error::ForecastLabels {
                labels: times.len(),
                steps: grid.steps(),
            })
        }
        Some(times) => times.clone(),
        None => request.variable.forecast_times(grid.steps()),
    };

    let messages = GribFile::read_all(&template_path)?;
    let first = messages
        .first()
        .ok_or_else(|| Error::EmptyTemplate(template_path.clone()))?;

    if let Some(expected) = &request.check_name {
        let found: String = first.read_key("name")?;
        if &found != expected {
            return Err(Error::NameMismatch {
                expected: expected.clone(),
                found,
            });
        }
    }

    let field = first.grid_field()?;
    let template_lats = field.latitude_axis().mapv(|v| round_to(v, request.decimals));
    let template_lons = field.longitude_axis().mapv(|v| round_to(v, request.decimals));

    info!(
        template = %template_path.display(),
        messages = messages.len(),
        steps = grid.steps(),
        "rewriting template"
    );

    fs::create_dir_all(&request.save_dir)?;

    let written = write_steps(
        &out_path,
        &messages,
        &grid,
        &forecast_times,
        &template_lats,
        &template_lons,
        request.variable,
        issue,
    );

    match written {
        Ok(()) => {
            info!(path = %out_path.display(), "grid file written");
            Ok(out_path)
        }
        Err(err) => {
            error!(path = %out_path.display(), error = %err, "grid file write failed");
            if out_path.exists() {
                if let Err(remove_err) = fs::remove_file(&out_path) {
                    error!(
                        path = %out_path.display(),
                        error = %remove_err,
                        "partial grid file not removed"
                    );
                }
            }
            Err(err)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn write_steps(
    out_path: &Path,
    messages: &[GribMessage],
    grid: &LocalGrid,
    forecast_times: &[i64],
    template_lats: &Array1<f64>,
    template_lons: &Array1<f64>,
    variable: ForecastVariable,
    issue: NaiveDateTime,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(out_path)?);
    let single = grid.steps() == 1;

    for (i, &forecast_time) in forecast_times.iter().enumerate() {
        let mut message = select_template(messages, single, forecast_time)?;

        let mut values = message.to_ndarray()?;
        patch_region(
            &mut values,
            template_lats,
            template_lons,
            grid.step(i),
            grid.lat_bounds(),
            grid.lon_bounds(),
        )?;

        if let Some(code) = variable.category_code() {
            categorize(&mut values, code);
        }

        message.set_grid_values(&values)?;
        patch_times(&mut message, issue, interval_end(issue, variable, i))?;
        message.write_to(&mut writer)?;

        debug!(step = i, forecast_time, "message written");
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use float_cmp::assert_approx_eq;
    use ndarray::{array, Array2};

    fn issue() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 19)
            .and_then(|d| d.and_hms_opt(20, 0, 0))
            .expect("valid test date")
    }

    #[test]
    fn issue_time_parsing() -> Result<()> {
        assert_eq!(parse_issue_time("202403192000")?, issue());
        assert!(matches!(parse_issue_time("2024031920"), Err(Error::IssueTime(_))));
        assert!(matches!(parse_issue_time("20240319200a"), Err(Error::IssueTime(_))));
        assert!(matches!(parse_issue_time("202413192000"), Err(Error::IssueTime(_))));

        Ok(())
    }

    #[test]
    fn interval_ends() {
        let day_later = NaiveDate::from_ymd_opt(2024, 3, 20)
            .and_then(|d| d.and_hms_opt(20, 0, 0))
            .expect("valid test date");
        assert_eq!(interval_end(issue(), ForecastVariable::Tmax, 0), day_later);

        let next_day = NaiveDate::from_ymd_opt(2024, 3, 20)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid test date");
        assert_eq!(interval_end(issue(), ForecastVariable::R01, 3), next_day);
        assert_eq!(
            interval_end(issue(), ForecastVariable::Rat, 0),
            issue() + Duration::hours(1)
        );
    }

    #[test]
    fn patch_writes_inside_bounds() -> Result<()> {
        let mut values = Array2::<f64>::zeros((4, 5));
        // template scanned north to south
        let lats = array![26.03, 26.02, 26.01, 26.00];
        let lons = array![110.00, 110.01, 110.02, 110.03, 110.04];
        let local = array![[1.0, 2.0], [3.0, 4.0]];

        patch_region(
            &mut values,
            &lats,
            &lons,
            local.view(),
            (26.01, 26.02),
            (110.02, 110.03),
        )?;

        assert_eq!(values[[1, 2]], 1.0);
        assert_eq!(values[[1, 3]], 2.0);
        assert_eq!(values[[2, 2]], 3.0);
        assert_eq!(values[[2, 3]], 4.0);
        assert_eq!(values.iter().filter(|&&v| v != 0.0).count(), 4);

        Ok(())
    }

    #[test]
    fn patch_rejects_misaligned_grid() {
        let mut values = Array2::<f64>::zeros((4, 5));
        let lats = array![26.03, 26.02, 26.01, 26.00];
        let lons = array![110.00, 110.01, 110.02, 110.03, 110.04];
        let local = Array2::<f64>::ones((3, 2));

        let result = patch_region(
            &mut values,
            &lats,
            &lons,
            local.view(),
            (26.01, 26.02),
            (110.02, 110.03),
        );

        assert!(matches!(
            result,
            Err(Error::RegionMismatch {
                rows: 2,
                cols: 2,
                lat: 3,
                lon: 2
            })
        ));
    }

    #[test]
    fn categories() {
        let mut values = array![[-3.0, 0.0], [0.1, 20.0]];

        categorize(&mut values, 63.0);

        assert_eq!(values, array![[-1.0, -1.0], [63.0, 63.0]]);
    }

    #[test]
    fn time_keys() -> anyhow::Result<()> {
        let mut msg = crate::test_support::test_template(0)?;

        patch_times(&mut msg, issue(), interval_end(issue(), ForecastVariable::R01, 5))?;

        let date: i64 = msg.read_key("dataDate")?;
        let time: i64 = msg.read_key("dataTime")?;
        let end_day: i64 = msg.read_key("dayOfEndOfOverallTimeInterval")?;
        let end_hour: i64 = msg.read_key("hourOfEndOfOverallTimeInterval")?;

        assert_eq!(date, 20240319);
        assert_eq!(time, 2000);
        assert_eq!(end_day, 20);
        assert_eq!(end_hour, 1);

        Ok(())
    }

    #[test]
    fn time_keys_without_interval() -> anyhow::Result<()> {
        let mut msg = GribMessage::from_sample("regular_ll_sfc_grib2")?;
        assert!(!msg.is_defined("yearOfEndOfOverallTimeInterval")?);

        patch_times(&mut msg, issue(), interval_end(issue(), ForecastVariable::Tmp, 0))?;

        let time: i64 = msg.read_key("dataTime")?;
        assert_eq!(time, 2000);

        Ok(())
    }

    #[test]
    fn template_selection() -> anyhow::Result<()> {
        let messages = vec![
            crate::test_support::test_template(0)?,
            crate::test_support::test_template(1)?,
            crate::test_support::test_template(2)?,
        ];

        let msg = select_template(&messages, false, 2)?;
        let step: i64 = msg.read_key("forecastTime")?;
        assert_eq!(step, 2);

        let msg = select_template(&messages, true, 5)?;
        let step: i64 = msg.read_key("forecastTime")?;
        assert_eq!(step, 0);

        assert!(matches!(
            select_template(&messages, false, 5),
            Err(Error::MissingForecastTime(5))
        ));

        let field = messages[0].to_ndarray()?;
        assert_approx_eq!(f64, field[[10, 10]], 5.0, epsilon = 1e-3);
        assert_approx_eq!(f64, field[[0, 0]], 6.0, epsilon = 1e-3);

        Ok(())
    }
}
