//! Station table of the bulletin and its city filter

use std::{fs::File, io::Read, path::Path};

use encoding_rs::GBK;
use encoding_rs_io::DecodeReaderBytesBuilder;
use serde::Deserialize;
use tracing::debug;

use crate::errors::Result;

/// Default location of the station table.
pub const DEFAULT_STATION_FILE: &str = "./userdata/stations98.csv";

/// City filter selecting every station.
pub const ALL_STATIONS: &str = "测试";

/// Provincial units whose bulletin covers the Changsha-Zhuzhou-Xiangtan area.
const PROVINCIAL_UNITS: [&str; 4] = ["信息中心", "气象服务中心", "科研所", "湖南分院"];

const PROVINCIAL_CITIES: [&str; 3] = ["长沙市", "株洲市", "湘潭市"];

/// One forecast station.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Station {
    #[serde(rename = "台站号")]
    pub id: String,
    #[serde(rename = "纬度")]
    pub lat: f64,
    #[serde(rename = "经度")]
    pub lon: f64,
    #[serde(rename = "市", default)]
    pub city: Option<String>,
}

/// Reads the station table from a GBK-encoded CSV file with a header row.
pub fn read_stations<P: AsRef<Path>>(path: P) -> Result<Vec<Station>> {
    let file = File::open(path.as_ref())?;
    let stations = parse_stations(file)?;

    debug!(path = %path.as_ref().display(), count = stations.len(), "station table read");

    Ok(stations)
}

/// Parses a station table from any reader.
///
/// The bytes are decoded as GBK unless they start with a UTF-8 or UTF-16
/// byte order mark.
pub fn parse_stations<R: Read>(reader: R) -> Result<Vec<Station>> {
    let decoded = DecodeReaderBytesBuilder::new()
        .encoding(Some(GBK))
        .bom_override(true)
        .build(reader);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(decoded);

    let mut stations = Vec::new();
    for record in reader.deserialize() {
        let station: Station = record?;
        stations.push(station);
    }

    Ok(stations)
}

/// Keeps the stations of `city`.
///
/// No city or [`ALL_STATIONS`] keeps every station, a provincial unit keeps the stations
/// of Changsha, Zhuzhou and Xiangtan, any other name keeps the stations of that city.
pub fn filter_by_city(stations: Vec<Station>, city: Option<&str>) -> Vec<Station> {
    let city = match city {
        None | Some(ALL_STATIONS) => return stations,
        Some(city) => city,
    };

    let in_city = |station: &Station| match station.city.as_deref() {
        Some(name) if PROVINCIAL_UNITS.contains(&city) => PROVINCIAL_CITIES.contains(&name),
        Some(name) => name == city,
        None => false,
    };

    stations.into_iter().filter(in_city).collect()
}
