//! Forecast variables of the NWGD grid products

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Forecast variable of a grid product, named by its code in the file name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ForecastVariable {
    /// Hourly temperature, 24 steps
    Tmp,
    /// Maximum temperature over 24 hours
    Tmax,
    /// Minimum temperature over 24 hours
    Tmin,
    /// Hourly precipitation, 24 steps
    R01,
    /// Hourly short-time severe precipitation, 12 steps
    Rat,
    /// Hourly thunderstorm gale, 12 steps
    Smg,
}

impl ForecastVariable {
    /// Every variable, in file naming order.
    pub const ALL: [ForecastVariable; 6] = [
        ForecastVariable::Tmp,
        ForecastVariable::Tmax,
        ForecastVariable::Tmin,
        ForecastVariable::R01,
        ForecastVariable::Rat,
        ForecastVariable::Smg,
    ];

    /// Code used in file names, e.g. `TMAX`.
    pub fn code(self) -> &'static str {
        match self {
            ForecastVariable::Tmp => "TMP",
            ForecastVariable::Tmax => "TMAX",
            ForecastVariable::Tmin => "TMIN",
            ForecastVariable::R01 => "R01",
            ForecastVariable::Rat => "RAT",
            ForecastVariable::Smg => "SMG",
        }
    }

    /// Number of forecast steps a product of this variable holds.
    pub fn expected_steps(self) -> usize {
        match self {
            ForecastVariable::Tmp | ForecastVariable::R01 => 24,
            ForecastVariable::Tmax | ForecastVariable::Tmin => 1,
            ForecastVariable::Rat | ForecastVariable::Smg => 12,
        }
    }

    /// Trailing tag of the file name: forecast range in hours followed by the step length.
    pub fn file_tag(self) -> &'static str {
        match self {
            ForecastVariable::Tmp | ForecastVariable::R01 => "02401",
            ForecastVariable::Tmax | ForecastVariable::Tmin => "02424",
            ForecastVariable::Rat | ForecastVariable::Smg => "01201",
        }
    }

    /// `forecastTime` of the first template message.
    pub fn first_forecast_time(self) -> i64 {
        match self {
            ForecastVariable::Tmp => 1,
            _ => 0,
        }
    }

    /// Default `forecastTime` labels for `steps` consecutive steps.
    pub fn forecast_times(self, steps: usize) -> Vec<i64> {
        let first = self.first_forecast_time();
        (first..).take(steps).collect()
    }

    /// Code written where the phenomenon is forecast, for the categorical variables.
    pub fn category_code(self) -> Option<f64> {
        match self {
            ForecastVariable::Rat => Some(63.0),
            ForecastVariable::Smg => Some(61.0),
            _ => None,
        }
    }

    /// Whether the product covers one 24 hour interval instead of hourly steps.
    pub fn is_daily_extreme(self) -> bool {
        matches!(self, ForecastVariable::Tmax | ForecastVariable::Tmin)
    }
}

impl fmt::Display for ForecastVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ForecastVariable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ForecastVariable::ALL
            .into_iter()
            .find(|v| v.code() == s)
            .ok_or_else(|| Error::UnknownVariable(s.to_owned()))
    }
}

impl TryFrom<String> for ForecastVariable {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ForecastVariable> for String {
    fn from(value: ForecastVariable) -> Self {
        value.code().to_owned()
    }
}
