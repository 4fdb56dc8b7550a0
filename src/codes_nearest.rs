//! Definition and associated functions of `NearestLookup`
//! used for finding nearest gridpoints in `GribMessage`

use std::ptr::null_mut;

use eccodes_sys::codes_nearest;
use tracing::{event, instrument, Level};

use crate::{
    errors::CodesError,
    intermediate_bindings::{
        codes_grib_nearest_delete, codes_grib_nearest_find, codes_grib_nearest_new,
    },
    GribMessage,
};

/// The structure used to find nearest gridpoints in `GribMessage`.
#[derive(Debug)]
pub struct NearestLookup<'a> {
    nearest_handle: *mut codes_nearest,
    parent_message: &'a GribMessage,
}

/// The structure returned by [`NearestLookup::find_nearest()`].
/// Should always be analysed in relation to the coordinates requested in `find_nearest()`.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct NearestGridpoint {
    ///Index of this gridpoint
    pub index: i32,
    ///Latitude of this gridpoint in degrees north
    pub lat: f64,
    ///Longitude of this gridpoint in degrees east
    pub lon: f64,
    /// Distance between requested point and this gridpoint in kilometers
    pub distance: f64,
    ///Value of parameter at this gridpoint contained by `GribMessage` in corresponding units
    pub value: f64,
}

impl GribMessage {
    /// Creates a new instance of [`NearestLookup`] for the `GribMessage`.
    ///
    /// # Errors
    ///
    /// This function returns [`CodesInternal`](crate::errors::CodesInternal) when
    /// internal nearest handle cannot be created.
    pub fn nearest(&self) -> Result<NearestLookup<'_>, CodesError> {
        let nearest_handle = unsafe { codes_grib_nearest_new(self.message_handle)? };

        Ok(NearestLookup {
            nearest_handle,
            parent_message: self,
        })
    }
}

impl NearestLookup<'_> {
    ///Function to get four [`NearestGridpoint`]s of a point represented by requested coordinates.
    ///
    ///The inputs are latitude and longitude of requested point in respectively degrees north and
    ///degrees east.
    ///
    ///### Errors
    ///
    ///This function returns [`CodesInternal`](crate::errors::CodesInternal) when
    ///one of ecCodes function returns the non-zero code.
    pub fn find_nearest(&mut self, lat: f64, lon: f64) -> Result<[NearestGridpoint; 4], CodesError> {
        unsafe {
            codes_grib_nearest_find(
                self.parent_message.message_handle,
                self.nearest_handle,
                lat,
                lon,
            )
        }
    }

    /// The single gridpoint closest to requested coordinates.
    ///
    /// ### Errors
    ///
    /// Same as [`find_nearest()`](NearestLookup::find_nearest).
    pub fn closest(&mut self, lat: f64, lon: f64) -> Result<NearestGridpoint, CodesError> {
        let points = self.find_nearest(lat, lon)?;

        Ok(points
            .into_iter()
            .fold(points[0], |best, p| if p.distance < best.distance { p } else { best }))
    }
}

impl Drop for NearestLookup<'_> {
    /// # Panics
    ///
    /// In debug mode when error is encountered.
    #[instrument(level = "trace")]
    fn drop(&mut self) {
        unsafe {
            codes_grib_nearest_delete(self.nearest_handle).unwrap_or_else(|error| {
                event!(
                    Level::ERROR,
                    "codes_grib_nearest_delete() returned an error: {:?}",
                    &error
                );
                debug_assert!(false, "Error in NearestLookup::drop");
            });
        }

        self.nearest_handle = null_mut();
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use float_cmp::assert_approx_eq;
    use ndarray::Array2;

    use crate::test_support::test_template;

    #[test]
    fn find_nearest() -> Result<()> {
        let msg = test_template(0)?;
        let mut nrst = msg.nearest()?;

        let out = nrst.find_nearest(26.001, 110.004)?;

        assert!(out.iter().all(|p| p.distance < 2.0));
        assert!(out.iter().all(|p| (p.value - 5.0).abs() < 1e-6));

        Ok(())
    }

    #[test]
    fn closest_point() -> Result<()> {
        let mut msg = test_template(0)?;

        let mut values = Array2::<f64>::zeros((21, 21));
        // row 10 is 26.00N, column 11 is 110.01E
        values[[10, 11]] = 7.0;
        msg.set_grid_values(&values)?;

        let mut nrst = msg.nearest()?;
        let point = nrst.closest(26.002, 110.009)?;

        assert_approx_eq!(f64, point.lat, 26.0, epsilon = 1e-6);
        assert_approx_eq!(f64, point.lon, 110.01, epsilon = 1e-6);
        assert_approx_eq!(f64, point.value, 7.0, epsilon = 1e-3);

        Ok(())
    }

    #[test]
    fn destructor() -> Result<()> {
        let msg = test_template(0)?;

        let _nrst = msg.nearest()?;

        Ok(())
    }
}
