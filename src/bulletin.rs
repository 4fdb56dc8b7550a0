//! Station bulletin of short-time severe precipitation and thunderstorm gale
//!
//! The bulletin is a fixed-width text file. Every station gets a header line followed by
//! 24 hourly lines, of which only the first 12 carry the two presence flags; all other
//! columns hold the missing value `999.9`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use ndarray::Array2;
use tracing::{info, instrument};

use crate::{
    errors::{Error, Result},
    extract::{presence, sample_stations},
    naming,
    stations::{filter_by_city, read_stations, Station, DEFAULT_STATION_FILE},
};

/// Region codes and the city each region reports for.
pub const REGIONS: [(&str, &str); 19] = [
    ("HNCS", "长沙市"),
    ("HNZZ", "株洲市"),
    ("HNXT", "湘潭市"),
    ("HNUY", "岳阳市"),
    ("HNCD", "常德市"),
    ("HNZJ", "张家界市"),
    ("HNXX", "湘西土家族苗族自治州"),
    ("HNHH", "怀化市"),
    ("HNYY", "益阳市"),
    ("HNSY", "邵阳市"),
    ("HNLD", "娄底市"),
    ("HNYZ", "永州市"),
    ("HNHY", "衡阳市"),
    ("HNCZ", "郴州市"),
    ("HNXZ", "信息中心"),
    ("HNFW", "气象服务中心"),
    ("HNKY", "科研所"),
    ("HNFY", "湖南分院"),
    ("CCCC", "测试"),
];

/// Hourly lines carrying forecast flags.
pub const FLAGGED_HOURS: usize = 12;

const TOTAL_HOURS: usize = 24;
const MISSING: &str = "999.9";

/// City of a region code.
pub fn region_city(region: &str) -> Result<&'static str> {
    REGIONS
        .iter()
        .find(|(code, _)| *code == region)
        .map(|(_, city)| *city)
        .ok_or_else(|| Error::UnknownRegion(region.to_owned()))
}

/// City as written in the bulletin title.
///
/// Prefectures drop their final character (`长沙市` → `长沙`), Xiangxi uses its short
/// name and provincial units keep their name.
pub fn title_city(region: &str, city: &str) -> String {
    match region {
        "HNXX" => "湘西州".to_owned(),
        "HNXZ" | "HNFW" | "HNKY" | "HNFY" | "CCCC" => city.to_owned(),
        _ => {
            let mut chars = city.chars();
            chars.next_back();
            chars.as_str().to_owned()
        }
    }
}

/// Forecast cycle of a bulletin in UTC and Beijing time.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct IssueTime {
    pub utc: NaiveDateTime,
    pub bjt: NaiveDateTime,
}

impl IssueTime {
    /// Cycle of a bulletin produced at local (Beijing) time `now`.
    ///
    /// Before 09:00 the 00 UTC cycle is used, the 12 UTC cycle afterwards. The cycle
    /// date is the UTC date of `now`.
    pub fn from_local(now: NaiveDateTime) -> Self {
        let hour = if now.hour() < 9 { 0 } else { 12 };
        let date = (now - Duration::hours(8)).date();
        let utc = date.and_time(NaiveTime::default()) + Duration::hours(hour);

        IssueTime {
            utc,
            bjt: utc + Duration::hours(8),
        }
    }
}

fn check_flags(product: &str, flags: &Array2<u8>, stations: usize) -> Result<()> {
    let (rows, cols) = flags.dim();

    if stations > 0 && (rows < FLAGGED_HOURS || cols < stations) {
        return Err(Error::FlagShape {
            product: product.to_owned(),
            rows,
            cols,
            required_rows: FLAGGED_HOURS,
            stations,
        });
    }

    Ok(())
}

/// Formats the bulletin text.
///
/// `rat` and `smg` hold presence flags indexed `[hour, station]`.
///
/// # Errors
///
/// Returns [`Error::FlagShape`] when either array has fewer than [`FLAGGED_HOURS`] rows
/// or fewer columns than there are stations.
pub fn format_bulletin(
    region: &str,
    title_city: &str,
    issue: IssueTime,
    stations: &[Station],
    rat: &Array2<u8>,
    smg: &Array2<u8>,
) -> Result<String> {
    check_flags("RAT", rat, stations.len())?;
    check_flags("SMG", smg, stations.len())?;

    let cycle = issue.utc.format("%Y%m%d%H");
    let mut text = String::new();

    text.push_str("ZCZC\n");
    text.push_str(&format!("FSCI50 {region} {}\n", issue.bjt.format("%d%H%M")));
    text.push_str(&format!("{cycle}时{title_city}网格竞赛强对流预报产品\n"));
    text.push_str(&format!("SPCC     {cycle}\n"));
    text.push_str(&format!("{}\n", stations.len()));

    let flagged_padding = format!("{MISSING} ").repeat(21);
    let padding = format!("{MISSING} ").repeat(23);

    for (i, station) in stations.iter().enumerate() {
        text.push_str(&format!(
            "{} {:?} {:?} 100 24 23\n",
            station.id, station.lon, station.lat
        ));

        for j in 0..FLAGGED_HOURS {
            text.push_str(&format!(
                "{} {flagged_padding}{} {}\n",
                j + 1,
                rat[[j, i]],
                smg[[j, i]]
            ));
        }
        for j in FLAGGED_HOURS..TOTAL_HOURS {
            text.push_str(&format!("{} {padding}\n", j + 1));
        }
    }

    text.push_str("NNNN\n");
    Ok(text)
}

/// Inputs of a station bulletin.
#[derive(Clone, Debug)]
pub struct StationRequest {
    /// Short-time severe precipitation grid product
    pub rat_file: PathBuf,
    /// Thunderstorm gale grid product
    pub smg_file: PathBuf,
    pub save_dir: PathBuf,
    pub region: String,
    /// City filter, defaults to the region's city
    pub city: Option<String>,
    pub station_file: PathBuf,
}

impl StationRequest {
    pub fn new(
        rat_file: impl Into<PathBuf>,
        smg_file: impl Into<PathBuf>,
        save_dir: impl Into<PathBuf>,
        region: impl Into<String>,
    ) -> Self {
        StationRequest {
            rat_file: rat_file.into(),
            smg_file: smg_file.into(),
            save_dir: save_dir.into(),
            region: region.into(),
            city: None,
            station_file: PathBuf::from(DEFAULT_STATION_FILE),
        }
    }
}

fn flags(grid_file: &Path, stations: &[Station]) -> Result<Array2<u8>> {
    let values = sample_stations(grid_file, stations)?;
    let found = values.nrows();

    // the message count is only known for a non-empty station list
    if !stations.is_empty() && found < FLAGGED_HOURS {
        return Err(Error::TooFewSteps {
            path: grid_file.to_path_buf(),
            found,
            required: FLAGGED_HOURS,
        });
    }

    Ok(presence(&values))
}

/// Writes the station bulletin produced at local time `now` and returns its path.
#[instrument(level = "info", skip(request), fields(region = %request.region))]
pub fn write_station(request: &StationRequest, now: NaiveDateTime) -> Result<PathBuf> {
    let default_city = region_city(&request.region)?;
    let city = request.city.as_deref().unwrap_or(default_city);
    let issue = IssueTime::from_local(now);

    let stations = filter_by_city(read_stations(&request.station_file)?, Some(city));
    let rat = flags(&request.rat_file, &stations)?;
    let smg = flags(&request.smg_file, &stations)?;

    let text = format_bulletin(
        &request.region,
        &title_city(&request.region, city),
        issue,
        &stations,
        &rat,
        &smg,
    )?;

    fs::create_dir_all(&request.save_dir)?;
    let path = request
        .save_dir
        .join(naming::station_file_name(&request.region, now, issue.bjt));
    fs::write(&path, text)?;

    info!(path = %path.display(), stations = stations.len(), "station file written");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid test date")
    }

    #[test]
    fn regions() -> Result<()> {
        assert_eq!(region_city("HNCS")?, "长沙市");
        assert_eq!(region_city("CCCC")?, "测试");
        assert!(matches!(region_city("HNXY"), Err(Error::UnknownRegion(_))));

        Ok(())
    }

    #[test]
    fn title_cities() {
        assert_eq!(title_city("HNCS", "长沙市"), "长沙");
        assert_eq!(title_city("HNZJ", "张家界市"), "张家界");
        assert_eq!(title_city("HNXX", "湘西土家族苗族自治州"), "湘西州");
        assert_eq!(title_city("HNKY", "科研所"), "科研所");
        assert_eq!(title_city("CCCC", "测试"), "测试");
    }

    #[test]
    fn morning_cycle() {
        let issue = IssueTime::from_local(at(2024, 3, 20, 7, 30));

        assert_eq!(issue.utc, at(2024, 3, 19, 0, 0));
        assert_eq!(issue.bjt, at(2024, 3, 19, 8, 0));
    }

    #[test]
    fn afternoon_cycle() {
        let issue = IssueTime::from_local(at(2024, 3, 20, 15, 10));

        assert_eq!(issue.utc, at(2024, 3, 20, 12, 0));
        assert_eq!(issue.bjt, at(2024, 3, 20, 20, 0));
    }

    #[test]
    fn bulletin_layout() -> Result<()> {
        let stations = vec![
            Station {
                id: "57679".to_owned(),
                lat: 28.2117,
                lon: 113.1972,
                city: None,
            },
            Station {
                id: "57687".to_owned(),
                lat: 28.0,
                lon: 112.0,
                city: None,
            },
        ];
        let mut rat = Array2::<u8>::zeros((12, 2));
        let mut smg = Array2::<u8>::zeros((12, 2));
        rat[[0, 0]] = 1;
        smg[[11, 1]] = 1;
        let issue = IssueTime::from_local(at(2024, 3, 20, 15, 10));

        let text = format_bulletin("HNCS", "长沙", issue, &stations, &rat, &smg)?;
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5 + 2 * 25 + 1);
        assert_eq!(lines[0], "ZCZC");
        assert_eq!(lines[1], "FSCI50 HNCS 202000");
        assert_eq!(lines[2], "2024032012时长沙网格竞赛强对流预报产品");
        assert_eq!(lines[3], "SPCC     2024032012");
        assert_eq!(lines[4], "2");
        assert_eq!(lines[5], "57679 113.1972 28.2117 100 24 23");
        assert_eq!(lines[6], format!("1 {}1 0", "999.9 ".repeat(21)));
        assert_eq!(lines[18], format!("13 {}", "999.9 ".repeat(23)));
        assert_eq!(lines[30], "57687 112.0 28.0 100 24 23");
        assert_eq!(lines[42], format!("12 {}0 1", "999.9 ".repeat(21)));
        assert_eq!(lines[55], "NNNN");
        assert!(text.ends_with("NNNN\n"));

        Ok(())
    }

    #[test]
    fn flags_must_cover_hours_and_stations() {
        let stations = vec![
            Station {
                id: "57679".to_owned(),
                lat: 28.2117,
                lon: 113.1972,
                city: None,
            },
            Station {
                id: "57687".to_owned(),
                lat: 28.0,
                lon: 112.0,
                city: None,
            },
        ];
        let full = Array2::<u8>::zeros((12, 2));
        let short = Array2::<u8>::zeros((3, 2));
        let narrow = Array2::<u8>::zeros((12, 1));
        let issue = IssueTime::from_local(at(2024, 3, 20, 15, 10));

        assert!(matches!(
            format_bulletin("HNCS", "长沙", issue, &stations, &short, &full),
            Err(Error::FlagShape { ref product, rows: 3, .. }) if product == "RAT"
        ));
        assert!(matches!(
            format_bulletin("HNCS", "长沙", issue, &stations, &full, &narrow),
            Err(Error::FlagShape { ref product, cols: 1, stations: 2, .. }) if product == "SMG"
        ));
    }

    #[test]
    fn empty_bulletin() -> Result<()> {
        let issue = IssueTime::from_local(at(2024, 3, 20, 8, 59));
        let empty = Array2::<u8>::zeros((0, 0));

        let text = format_bulletin("CCCC", "测试", issue, &[], &empty, &empty)?;

        assert_eq!(
            text,
            "ZCZC\nFSCI50 CCCC 200800\n2024032000时测试网格竞赛强对流预报产品\nSPCC     2024032000\n0\nNNNN\n"
        );

        Ok(())
    }
}
