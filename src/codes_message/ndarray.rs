//! Conversion of message rasters to and from ndarray

use ndarray::{s, Array1, Array2, Array3};

use crate::{errors::CodesError, GribMessage, KeyRead, KeyWrite};

/// Raster of a message on a regular grid, returned by [`GribMessage::grid_field()`].
///
/// The arrays are collocated, meaning that `longitudes[i, j]` and `latitudes[i, j]` are
/// the coordinates of `values[i, j]`. The first dimension is the row (`Nj`), the second the
/// column (`Ni`), in the scanning order of the message.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct GridField {
    /// Longitudes in degrees
    pub longitudes: Array2<f64>,
    /// Latitudes in degrees
    pub latitudes: Array2<f64>,
    /// Values in native GRIB units
    pub values: Array2<f64>,
}

impl GridField {
    /// Latitude of each row.
    pub fn latitude_axis(&self) -> Array1<f64> {
        self.latitudes.column(0).to_owned()
    }

    /// Longitude of each column.
    pub fn longitude_axis(&self) -> Array1<f64> {
        self.longitudes.row(0).to_owned()
    }
}

struct GridShape {
    ni: usize,
    nj: usize,
    j_consecutive: bool,
}

impl GribMessage {
    fn grid_shape(&self) -> Result<GridShape, CodesError> {
        let ni: i64 = self.read_key("Ni")?;
        let ni = usize::try_from(ni)?;

        let nj: i64 = self.read_key("Nj")?;
        let nj = usize::try_from(nj)?;

        let j_scanning: i64 = self.read_key("jPointsAreConsecutive")?;

        if ![0, 1].contains(&j_scanning) {
            return Err(CodesError::UnexpectedKeyValue(
                "jPointsAreConsecutive".to_owned(),
            ));
        }

        Ok(GridShape {
            ni,
            nj,
            j_consecutive: j_scanning != 0,
        })
    }

    /// Converts the message values to a 2D ndarray.
    ///
    /// Returns ndarray where first dimension represents y coordinates and second dimension represents x coordinates,
    /// ie. `[lat, lon]`.
    ///
    /// Requires the keys `Ni`, `Nj` and `values` to be present in the message.
    ///
    /// # Errors
    ///
    /// - When the required keys are not present or if their values are not of the expected type
    /// - When the number of values mismatch with the `Ni` and `Nj` keys
    pub fn to_ndarray(&self) -> Result<Array2<f64>, CodesError> {
        let shape = self.grid_shape()?;

        let vals: Vec<f64> = self.read_key("values")?;
        if vals.len() != (shape.ni * shape.nj) {
            return Err(CodesError::UnexpectedValuesLength(
                vals.len(),
                shape.ni * shape.nj,
            ));
        }

        if shape.j_consecutive {
            Ok(Array2::from_shape_vec((shape.ni, shape.nj), vals)?.reversed_axes())
        } else {
            Ok(Array2::from_shape_vec((shape.nj, shape.ni), vals)?)
        }
    }

    /// Same as [`GribMessage::to_ndarray()`] but returns the longitudes and latitudes alongside values.
    ///
    /// This method requires the `latLonValues`, `Ni` and `Nj` keys to be present in the message.
    ///
    /// # Errors
    ///
    /// - When the required keys are not present or if their values are not of the expected type
    /// - When the number of values mismatch with the `Ni` and `Nj` keys
    pub fn grid_field(&self) -> Result<GridField, CodesError> {
        let shape = self.grid_shape()?;

        let latlonvals: Vec<f64> = self.read_key("latLonValues")?;

        if latlonvals.len() != (shape.ni * shape.nj * 3) {
            return Err(CodesError::UnexpectedValuesLength(
                latlonvals.len(),
                shape.ni * shape.nj * 3,
            ));
        }

        let dims = if shape.j_consecutive {
            (shape.ni, shape.nj, 3_usize)
        } else {
            (shape.nj, shape.ni, 3_usize)
        };

        let mut latlonvals = Array3::from_shape_vec(dims, latlonvals)?;

        if shape.j_consecutive {
            latlonvals.swap_axes(0, 1);
        }

        let (lats, lons, vals) =
            latlonvals
                .view_mut()
                .multi_slice_move((s![.., .., 0], s![.., .., 1], s![.., .., 2]));

        Ok(GridField {
            longitudes: lons.into_owned(),
            latitudes: lats.into_owned(),
            values: vals.into_owned(),
        })
    }

    /// Replaces the values of the message with given `[row, column]` array,
    /// the layout returned by [`to_ndarray()`](GribMessage::to_ndarray).
    ///
    /// Values are written back in the scanning order of the message.
    ///
    /// # Errors
    ///
    /// - When the array shape differs from `(Nj, Ni)`
    /// - When ecCodes fails to encode the values
    pub fn set_grid_values(&mut self, values: &Array2<f64>) -> Result<(), CodesError> {
        let shape = self.grid_shape()?;

        if values.dim() != (shape.nj, shape.ni) {
            return Err(CodesError::UnexpectedValuesLength(
                values.len(),
                shape.ni * shape.nj,
            ));
        }

        let flat: Vec<f64> = if shape.j_consecutive {
            values.t().iter().copied().collect()
        } else {
            values.iter().copied().collect()
        };

        self.write_key("values", flat.as_slice())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use crate::{test_support::test_template, GribMessage, KeyRead};
    use anyhow::Result;

    #[test]
    fn field_axes_follow_grid() -> Result<()> {
        let msg = test_template(0)?;
        let field = msg.grid_field()?;

        let lats = field.latitude_axis();
        let lons = field.longitude_axis();

        assert_eq!(lats.len(), 21);
        assert_eq!(lons.len(), 21);
        assert_approx_eq!(f64, lats[0], 26.10, epsilon = 1e-6);
        assert_approx_eq!(f64, lats[20], 25.90, epsilon = 1e-6);
        assert_approx_eq!(f64, lons[0], 109.90, epsilon = 1e-6);
        assert_approx_eq!(f64, lons[20], 110.10, epsilon = 1e-6);
        assert_approx_eq!(f64, field.values[[10, 10]], 5.0, epsilon = 1e-6);

        Ok(())
    }

    #[test]
    fn ndarray_matches_field() -> Result<()> {
        let msg = test_template(0)?;

        let values = msg.to_ndarray()?;
        let field = msg.grid_field()?;

        assert_eq!(values.dim(), (21, 21));
        assert_eq!(values.dim(), field.values.dim());

        Ok(())
    }

    #[test]
    fn set_values_round_trip() -> Result<()> {
        let mut msg = test_template(0)?;

        let mut values = msg.to_ndarray()?;
        values[[0, 0]] = 1.0;
        values[[20, 20]] = 9.0;
        msg.set_grid_values(&values)?;

        let written = msg.to_ndarray()?;
        assert_approx_eq!(f64, written[[0, 0]], 1.0, epsilon = 1e-3);
        assert_approx_eq!(f64, written[[20, 20]], 9.0, epsilon = 1e-3);
        assert_approx_eq!(f64, written[[5, 5]], 5.0, epsilon = 1e-3);

        Ok(())
    }

    #[test]
    fn set_values_rejects_wrong_shape() -> Result<()> {
        let mut msg = GribMessage::from_sample("regular_ll_sfc_grib2")?;
        let ni: i64 = msg.read_key("Ni")?;

        let values = ndarray::Array2::<f64>::zeros((1, ni as usize + 1));

        assert!(msg.set_grid_values(&values).is_err());

        Ok(())
    }
}
