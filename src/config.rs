//! Configuration of the command line tools.
//!
//! Settings that rarely change between runs are layered with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)
//!
//! Per-run inputs (issue time, variable, data file) are only taken from the command line.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::{
    bulletin::{region_city, StationRequest},
    errors::{Error, Result},
    grid::{read_raw_data, Extent, DEFAULT_DECIMALS, DEFAULT_STEP},
    naming,
    rewrite::RewriteRequest,
    stations::DEFAULT_STATION_FILE,
    ForecastVariable,
};

/// Command-line arguments of `nwgd-write-grib`
#[derive(Parser, Debug)]
#[command(name = "nwgd-write-grib")]
#[command(author, version, about = "Patch a local forecast into an NWGD GRIB2 template", long_about = None)]
pub struct GribArgs {
    /// Issue time, YYYYmmddHHMM
    pub sdate: String,

    /// Forecast variable: TMP, TMAX, TMIN, R01, RAT or SMG
    #[arg(value_parser = parse_variable)]
    pub variable: ForecastVariable,

    /// Local forecast as little-endian f32 in (step, lat, lon) order
    pub data_file: PathBuf,

    /// Directory with the national templates
    #[arg(long, env = "NWGD_SAMPLE_PATH")]
    pub sample_path: Option<PathBuf>,

    /// Directory the product is written to
    #[arg(long, env = "NWGD_SAVE_PATH")]
    pub save_path: Option<PathBuf>,

    /// Region code used in the file name
    #[arg(short, long, env = "NWGD_REGION")]
    pub region: Option<String>,

    /// Local extent as min_lat,max_lat,min_lon,max_lon
    #[arg(long, env = "NWGD_EXTENT", value_delimiter = ',')]
    pub extent: Option<Vec<f64>>,

    /// Grid spacing in degrees
    #[arg(long, env = "NWGD_STEP")]
    pub step: Option<f64>,

    /// Decimal places coordinates are rounded to
    #[arg(long, env = "NWGD_DECIMALS")]
    pub decimals: Option<u32>,

    /// Expected parameter name of the template
    #[arg(long)]
    pub check_name: Option<String>,

    /// Template forecastTime of every step, comma separated
    #[arg(long, value_delimiter = ',')]
    pub forecast_times: Option<Vec<i64>>,

    /// Output file name instead of the bulletin name
    #[arg(long)]
    pub save_name: Option<String>,

    /// Template file instead of the lookup in the sample path
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "NWGD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "NWGD_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Command-line arguments of `nwgd-write-station`
#[derive(Parser, Debug)]
#[command(name = "nwgd-write-station")]
#[command(author, version, about = "Write the severe convection station bulletin", long_about = None)]
pub struct StationArgs {
    /// Short-time severe precipitation product, found in the source path if omitted
    #[arg(long)]
    pub rat_file: Option<PathBuf>,

    /// Thunderstorm gale product, found in the source path if omitted
    #[arg(long)]
    pub smg_file: Option<PathBuf>,

    /// Directory searched for the grid products
    #[arg(long, env = "NWGD_SOURCE_PATH")]
    pub source_path: Option<PathBuf>,

    /// Directory the bulletin is written to
    #[arg(long, env = "NWGD_SAVE_PATH")]
    pub save_path: Option<PathBuf>,

    /// Region code
    #[arg(short, long, env = "NWGD_REGION")]
    pub region: Option<String>,

    /// City whose stations are included, defaults to the region's city
    #[arg(long, env = "NWGD_CITY")]
    pub city: Option<String>,

    /// Station table (CSV)
    #[arg(long, env = "NWGD_STATION_FILE")]
    pub station_file: Option<PathBuf>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "NWGD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "NWGD_LOG_LEVEL")]
    pub log_level: Option<String>,
}

fn parse_variable(value: &str) -> std::result::Result<ForecastVariable, String> {
    value.parse().map_err(|e: Error| e.to_string())
}

/// Settings shared by both tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory with the national templates
    #[serde(default = "default_sample_path")]
    pub sample_path: PathBuf,

    /// Directory products are written to
    #[serde(default = "default_output_path")]
    pub save_path: PathBuf,

    /// Directory searched for grid products by the station tool
    #[serde(default = "default_output_path")]
    pub source_path: PathBuf,

    /// Region code
    #[serde(default = "default_region")]
    pub region: String,

    /// City filter of the station bulletin
    #[serde(default)]
    pub city: Option<String>,

    /// Local extent
    #[serde(default = "default_extent")]
    pub extent: Extent,

    /// Grid spacing in degrees
    #[serde(default = "default_step")]
    pub step: f64,

    /// Decimal places coordinates are rounded to
    #[serde(default = "default_decimals")]
    pub decimals: u32,

    /// Station table
    #[serde(default = "default_station_file")]
    pub station_file: PathBuf,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn layered(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::load_from_file(path),
            None => Ok(Config::default()),
        }
    }

    /// Configuration of the grid tool: defaults, config file, then arguments.
    pub fn for_grib(args: &GribArgs) -> Result<Self> {
        let mut config = Self::layered(args.config.as_deref())?;

        if let Some(path) = &args.sample_path {
            config.sample_path = path.clone();
        }
        if let Some(path) = &args.save_path {
            config.save_path = path.clone();
        }
        if let Some(region) = &args.region {
            config.region = region.clone();
        }
        if let Some(extent) = &args.extent {
            config.extent = extent_from_slice(extent)?;
        }
        if let Some(step) = args.step {
            config.step = step;
        }
        if let Some(decimals) = args.decimals {
            config.decimals = decimals;
        }
        if let Some(level) = &args.log_level {
            config.log_level = level.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Configuration of the station tool: defaults, config file, then arguments.
    pub fn for_station(args: &StationArgs) -> Result<Self> {
        let mut config = Self::layered(args.config.as_deref())?;

        if let Some(path) = &args.source_path {
            config.source_path = path.clone();
        }
        if let Some(path) = &args.save_path {
            config.save_path = path.clone();
        }
        if let Some(region) = &args.region {
            config.region = region.clone();
        }
        if args.city.is_some() {
            config.city = args.city.clone();
        }
        if let Some(path) = &args.station_file {
            config.station_file = path.clone();
        }
        if let Some(level) = &args.log_level {
            config.log_level = level.clone();
        }

        config.validate()?;
        region_city(&config.region)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            return Err(Error::Config {
                message: "Region cannot be empty".to_string(),
            });
        }

        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(Error::Config {
                message: format!("Grid step must be positive, got {}", self.step),
            });
        }

        let e = &self.extent;
        if !(e.min_lat < e.max_lat && e.min_lon < e.max_lon) {
            return Err(Error::Config {
                message: format!(
                    "Extent ({}, {}, {}, {}) must be ordered as min_lat, max_lat, min_lon, max_lon",
                    e.min_lat, e.max_lat, e.min_lon, e.max_lon
                ),
            });
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(Error::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }

    /// Rewrite request for the run described by `args`, reading its data file.
    pub fn rewrite_request(&self, args: &GribArgs) -> Result<RewriteRequest> {
        let data = read_raw_data(&args.data_file, &self.extent, self.step, self.decimals)?;

        let mut request = RewriteRequest::new(
            args.sdate.clone(),
            data,
            args.variable,
            self.extent,
            self.region.clone(),
            self.sample_path.clone(),
            self.save_path.clone(),
        );
        request.step = self.step;
        request.decimals = self.decimals;
        request.check_name = args.check_name.clone();
        request.forecast_times = args.forecast_times.clone();
        request.save_name = args.save_name.clone();
        request.template = args.template.clone();

        Ok(request)
    }

    /// Station request for the run described by `args`, finding the grid products
    /// in the source path unless given.
    pub fn station_request(&self, args: &StationArgs) -> Result<StationRequest> {
        let rat_file = match &args.rat_file {
            Some(path) => path.clone(),
            None => naming::find_grid_file(&self.source_path, ForecastVariable::Rat)?,
        };
        let smg_file = match &args.smg_file {
            Some(path) => path.clone(),
            None => naming::find_grid_file(&self.source_path, ForecastVariable::Smg)?,
        };

        let mut request =
            StationRequest::new(rat_file, smg_file, self.save_path.clone(), self.region.clone());
        request.city = self.city.clone();
        request.station_file = self.station_file.clone();

        Ok(request)
    }
}

fn extent_from_slice(values: &[f64]) -> Result<Extent> {
    match *values {
        [min_lat, max_lat, min_lon, max_lon] => Ok(Extent::new(min_lat, max_lat, min_lon, max_lon)),
        _ => Err(Error::Config {
            message: format!("Extent needs 4 values, got {}", values.len()),
        }),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_path: default_sample_path(),
            save_path: default_output_path(),
            source_path: default_output_path(),
            region: default_region(),
            city: None,
            extent: default_extent(),
            step: default_step(),
            decimals: default_decimals(),
            station_file: default_station_file(),
            log_level: default_log_level(),
        }
    }
}

fn default_sample_path() -> PathBuf {
    PathBuf::from("./sample")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./output")
}

fn default_region() -> String {
    "CCCC".to_string()
}

fn default_extent() -> Extent {
    Extent::new(26.0, 28.0, 110.0, 112.0)
}

fn default_step() -> f64 {
    DEFAULT_STEP
}

fn default_decimals() -> u32 {
    DEFAULT_DECIMALS
}

fn default_station_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATION_FILE)
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn grib_args(extra: &[&str]) -> GribArgs {
        let mut argv = vec!["nwgd-write-grib", "202403192000", "TMAX", "data.bin"];
        argv.extend_from_slice(extra);
        GribArgs::parse_from(argv)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.region, "CCCC");
        assert_eq!(config.extent, Extent::new(26.0, 28.0, 110.0, 112.0));
        assert_eq!(config.step, 0.01);
        assert_eq!(config.decimals, 2);
        assert_eq!(config.station_file, PathBuf::from("./userdata/stations98.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<()> {
        let config: Config = serde_json::from_str(r#"{"region": "HNCS", "step": 0.05}"#)?;

        assert_eq!(config.region, "HNCS");
        assert_eq!(config.step, 0.05);
        assert_eq!(config.sample_path, PathBuf::from("./sample"));
        assert_eq!(config.log_level, "info");

        Ok(())
    }

    #[test]
    fn test_arguments_override_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{"region": "HNCS", "save_path": "/data/out", "extent": {{"min_lat": 27.0, "max_lat": 29.0, "min_lon": 112.0, "max_lon": 114.0}}}}"#
        )?;
        file.flush()?;
        let config_path = file.path().to_string_lossy().into_owned();

        let args = grib_args(&["--config", &config_path, "--region", "HNZZ", "--step", "0.05"]);
        let config = Config::for_grib(&args)?;

        assert_eq!(config.region, "HNZZ");
        assert_eq!(config.step, 0.05);
        assert_eq!(config.save_path, PathBuf::from("/data/out"));
        assert_eq!(config.extent, Extent::new(27.0, 29.0, 112.0, 114.0));

        Ok(())
    }

    #[test]
    fn test_extent_argument() -> Result<()> {
        let args = grib_args(&["--extent", "25,26,111,112", "--forecast-times", "0,1,2"]);
        let config = Config::for_grib(&args)?;

        assert_eq!(config.extent, Extent::new(25.0, 26.0, 111.0, 112.0));
        assert_eq!(args.forecast_times, Some(vec![0, 1, 2]));
        assert_eq!(args.variable, ForecastVariable::Tmax);

        Ok(())
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let parsed = GribArgs::try_parse_from(["nwgd-write-grib", "202403192000", "WIND", "x.bin"]);

        assert!(parsed.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.step = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let mut config = Config::default();
        config.extent = Extent::new(28.0, 26.0, 110.0, 112.0);
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let mut config = Config::default();
        config.log_level = "verbose".to_string();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_station_region_checked() {
        let args = StationArgs::parse_from(["nwgd-write-station", "--region", "XXXX"]);

        assert!(matches!(
            Config::for_station(&args),
            Err(Error::UnknownRegion(_))
        ));
    }

    #[test]
    fn test_station_request_finds_products() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        for name in [
            "Z_NWGD_C_HNCS_20240319103000_P_OGFP_SPFC-RAT_202403192000_01201.GRB2",
            "Z_NWGD_C_HNCS_20240319103000_P_OGFP_SPFC-SMG_202403192000_01201.GRB2",
        ] {
            std::fs::File::create(dir.path().join(name))?;
        }
        let source = dir.path().to_string_lossy().into_owned();

        let args = StationArgs::parse_from([
            "nwgd-write-station",
            "--source-path",
            &source,
            "--region",
            "HNCS",
        ]);
        let config = Config::for_station(&args)?;
        let request = config.station_request(&args)?;

        assert!(request.rat_file.to_string_lossy().contains("SPFC-RAT_"));
        assert!(request.smg_file.to_string_lossy().contains("SPFC-SMG_"));
        assert_eq!(request.region, "HNCS");
        assert_eq!(request.city, None);

        Ok(())
    }
}
