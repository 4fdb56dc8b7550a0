//! Sampling grid products at station locations

use std::path::Path;

use fallible_iterator::FallibleIterator;
use ndarray::Array2;
use tracing::{debug, instrument};

use crate::{errors::Result, stations::Station, GribFile};

/// Values of the gridpoint nearest to each station, indexed `[message, station]`.
///
/// Messages are taken in file order. Of the four gridpoints surrounding a station
/// the one at the smallest distance is used.
#[instrument(level = "debug", skip(stations), fields(stations = stations.len()))]
pub fn sample_stations(grid_file: &Path, stations: &[Station]) -> Result<Array2<f64>> {
    let mut file = GribFile::open(grid_file)?;
    let mut rows = Vec::new();

    let mut messages = file.messages();
    while let Some(msg) = messages.next()? {
        let mut lookup = msg.nearest()?;
        for station in stations {
            rows.push(lookup.closest(station.lat, station.lon)?.value);
        }
    }

    let count = if stations.is_empty() {
        0
    } else {
        rows.len() / stations.len()
    };
    debug!(messages = count, "grid sampled");

    let values = Array2::from_shape_vec((count, stations.len()), rows)
        .map_err(crate::errors::CodesError::from)?;

    Ok(values)
}

/// Presence flags of a categorical product: `1` where the value is positive, `0` elsewhere.
pub fn presence(values: &Array2<f64>) -> Array2<u8> {
    values.mapv(|v| u8::from(v > 0.0))
}
