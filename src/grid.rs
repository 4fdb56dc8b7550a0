//! Local forecast grids: raw arrays labelled with latitude, longitude and step

use std::{fs, path::Path};

use ndarray::{Array1, Array3, ArrayD, ArrayView2, Axis, Ix2, Ix3};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, Result},
    ForecastVariable,
};

/// Grid spacing of local forecasts in degrees.
pub const DEFAULT_STEP: f64 = 0.01;

/// Decimal places coordinates are rounded to.
pub const DEFAULT_DECIMALS: u32 = 2;

/// Geographic extent of a local grid, bounds included.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Extent {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Extent {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Extent {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Latitudes of the grid rows, south to north.
    pub fn latitudes(&self, step: f64, decimals: u32) -> Array1<f64> {
        axis(self.min_lat, self.max_lat, step, decimals)
    }

    /// Longitudes of the grid columns, west to east.
    pub fn longitudes(&self, step: f64, decimals: u32) -> Array1<f64> {
        axis(self.min_lon, self.max_lon, step, decimals)
    }
}

/// Rounds `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10_f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Coordinates `start, start + step, ...` up to and including `end`, rounded to `decimals`.
///
/// `end` is extended by a tenth of a step so that it is kept despite floating point error.
pub fn axis(start: f64, end: f64, step: f64, decimals: u32) -> Array1<f64> {
    let stop = end + step / 10.0;
    let len = ((stop - start) / step).ceil();
    let len = if len.is_finite() && len > 0.0 { len as usize } else { 0 };

    Array1::from_iter((0..len).map(|i| round_to(start + i as f64 * step, decimals)))
}

/// Validates local data against its extent and the variable it forecasts.
///
/// `shape` is the shape of the raw array, `(lat, lon)` or `(step, lat, lon)`.
pub fn check_data(
    extent: &Extent,
    shape: &[usize],
    variable: ForecastVariable,
    step: f64,
    decimals: u32,
) -> Result<()> {
    if !(2..=3).contains(&shape.len()) {
        return Err(Error::Dimensionality(shape.len()));
    }

    let expected_lat = extent.latitudes(step, decimals).len();
    let expected_lon = extent.longitudes(step, decimals).len();
    let (lat, lon) = (shape[shape.len() - 2], shape[shape.len() - 1]);

    if lat != expected_lat || lon != expected_lon {
        return Err(Error::ShapeMismatch {
            expected_lat,
            expected_lon,
            lat,
            lon,
        });
    }

    let steps = if shape.len() == 3 { shape[0] } else { 1 };
    let expected = variable.expected_steps();

    if steps != expected {
        return Err(Error::StepCount {
            variable: variable.to_string(),
            expected,
            actual: steps,
        });
    }

    Ok(())
}

/// Local forecast data with its coordinates.
#[derive(Clone, PartialEq, Debug)]
pub struct LocalGrid {
    /// Values indexed `[step, lat, lon]`
    pub data: Array3<f64>,
    /// Latitude of each row
    pub latitudes: Array1<f64>,
    /// Longitude of each column
    pub longitudes: Array1<f64>,
    /// Step labels, `1..=steps`
    pub labels: Vec<usize>,
}

impl LocalGrid {
    /// Labels a 2D `(lat, lon)` or 3D `(step, lat, lon)` array with the coordinates of `extent`.
    /// A 2D array becomes a grid with a single step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dimensionality`] for other arrays and [`Error::ShapeMismatch`]
    /// when the array does not span the extent at given step.
    pub fn new(data: ArrayD<f64>, extent: &Extent, step: f64, decimals: u32) -> Result<Self> {
        let data = match data.ndim() {
            2 => data
                .into_dimensionality::<Ix2>()
                .map_err(|_| Error::Dimensionality(2))?
                .insert_axis(Axis(0)),
            3 => data
                .into_dimensionality::<Ix3>()
                .map_err(|_| Error::Dimensionality(3))?,
            n => return Err(Error::Dimensionality(n)),
        };

        let latitudes = extent.latitudes(step, decimals);
        let longitudes = extent.longitudes(step, decimals);
        let (steps, lat, lon) = data.dim();

        if lat != latitudes.len() || lon != longitudes.len() {
            return Err(Error::ShapeMismatch {
                expected_lat: latitudes.len(),
                expected_lon: longitudes.len(),
                lat,
                lon,
            });
        }

        Ok(LocalGrid {
            data,
            latitudes,
            longitudes,
            labels: (1..=steps).collect(),
        })
    }

    /// Number of forecast steps.
    pub fn steps(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Values of one step, indexed `[lat, lon]`.
    pub fn step(&self, index: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(0), index)
    }

    /// Smallest and largest latitude.
    pub fn lat_bounds(&self) -> (f64, f64) {
        bounds(&self.latitudes)
    }

    /// Smallest and largest longitude.
    pub fn lon_bounds(&self) -> (f64, f64) {
        bounds(&self.longitudes)
    }
}

fn bounds(axis: &Array1<f64>) -> (f64, f64) {
    axis.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

/// Reads local data stored as little-endian `f32` in `(step, lat, lon)` order.
///
/// The step count is inferred from the file length.
pub fn read_raw_data<P: AsRef<Path>>(
    path: P,
    extent: &Extent,
    step: f64,
    decimals: u32,
) -> Result<ArrayD<f64>> {
    let bytes = fs::read(path.as_ref())?;
    let lat = extent.latitudes(step, decimals).len();
    let lon = extent.longitudes(step, decimals).len();
    let plane = lat * lon;

    let values: Vec<f64> = bytes
        .chunks_exact(4)
        .map(|c| f64::from(f32::from_le_bytes([c[0], c[1], c[2], c[3]])))
        .collect();

    if bytes.len() % 4 != 0 || plane == 0 || values.len() % plane != 0 || values.is_empty() {
        return Err(Error::RawDataLength {
            path: path.as_ref().to_path_buf(),
            values: values.len(),
            plane,
        });
    }

    let count = values.len();
    let data = Array3::from_shape_vec((count / plane, lat, lon), values).map_err(|_| {
        Error::RawDataLength {
            path: path.as_ref().to_path_buf(),
            values: count,
            plane,
        }
    })?;

    Ok(data.into_dyn())
}
