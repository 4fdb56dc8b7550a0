//! Definition of `GribMessage` and its associated functions
//! used for reading and writing data of given variable from GRIB file

mod clone;
mod ndarray;
mod read;
mod write;

pub use self::ndarray::GridField;
pub use read::KeyRead;
pub use write::KeyWrite;

use eccodes_sys::codes_handle;
use std::{fmt::Debug, ptr::null_mut};
use tracing::{event, instrument, Level};

use crate::{
    errors::CodesError,
    intermediate_bindings::{
        codes_grib_handle_new_from_samples, codes_handle_delete, codes_is_defined,
    },
};

/// Structure that provides access to the data contained in a single GRIB message.
///
/// You can think about the message as a container of data corresponding to a single variable
/// at given date, time and level. In ecCodes the message is represented as a collection of unique
/// key-value pairs.
///
/// Keys are read with [`read_key()`](KeyRead::read_key) and written with
/// [`write_key()`](KeyWrite::write_key). The raster is available as [`GridField`]
/// through [`grid_field()`](GribMessage::grid_field), and
/// [`nearest()`](GribMessage::nearest) finds gridpoints closest to given coordinates.
///
/// Some of the keys used by this crate are: `name`, `forecastTime`, `dataDate`, `dataTime`,
/// `Ni`, `Nj` and `values`.
///
/// Destructor for this structure does not panic in release builds. Errors encountered
/// in the destructor are reported via [`tracing`].
#[derive(Debug)]
pub struct GribMessage {
    pub(crate) message_handle: *mut codes_handle,
}

// SAFETY: the handle is owned and never shared between messages.
unsafe impl Send for GribMessage {}

impl GribMessage {
    pub(crate) const fn new(handle: *mut codes_handle) -> Self {
        GribMessage {
            message_handle: handle,
        }
    }

    /// Creates a new message from an ecCodes sample, for example `regular_ll_sfc_grib2`.
    ///
    /// Samples are looked up in the sample path of the linked ecCodes installation
    /// (`ECCODES_SAMPLES_PATH` overrides it).
    ///
    /// # Errors
    ///
    /// Returns [`CodesError::MissingSample`] when ecCodes has no sample with given name.
    #[instrument(level = "debug")]
    pub fn from_sample(sample_name: &str) -> Result<Self, CodesError> {
        let handle = unsafe { codes_grib_handle_new_from_samples(sample_name)? };

        Ok(GribMessage::new(handle))
    }

    /// Checks whether the key with given name is defined in this message.
    ///
    /// Keys of optional template sections (for example the end of the overall time interval
    /// of statistically processed products) exist only in some messages.
    ///
    /// # Errors
    ///
    /// Returns [`CodesError::NulChar`] when the key name contains a nul byte.
    pub fn is_defined(&self, key_name: &str) -> Result<bool, CodesError> {
        unsafe { codes_is_defined(self.message_handle, key_name) }
    }
}

impl Drop for GribMessage {
    /// Executes the destructor for this type.
    /// This method calls destructor functions from ecCodes library.
    /// In some edge cases these functions can return non-zero code.
    /// In such case all pointers are safely deleted, however memory leaks can still occur.
    ///
    /// If any function called in the destructor returns an error, it is reported with [`tracing`].
    ///
    /// # Panics
    ///
    /// In debug mode when error is encountered.
    #[instrument(level = "trace")]
    fn drop(&mut self) {
        unsafe {
            codes_handle_delete(self.message_handle).unwrap_or_else(|error| {
                event!(
                    Level::ERROR,
                    "codes_handle_delete() returned an error: {:?}",
                    &error
                );
                debug_assert!(false, "Error in GribMessage::drop");
            });
        }

        self.message_handle = null_mut();
    }
}
