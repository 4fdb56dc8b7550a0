#![allow(non_camel_case_types)]

//!Module containing intermediate (type) bindings to ecCodes functions.
//!
//!These bindings convert Rust types to correct C types
//!correctly represent data as pointers and utilize some other functions
//!to make ecCodes usage safer and easier,
//!but they are unsafe as they operate on raw `codes_handle`.

mod codes_get;
mod codes_handle;
mod codes_set;
mod grib_nearest;

use num_traits::FromPrimitive;

use crate::errors::{CodesError, CodesInternal};

pub use codes_get::{
    codes_get_double, codes_get_double_array, codes_get_long, codes_get_message,
    codes_get_string, codes_is_defined,
};
pub use codes_handle::{
    codes_grib_handle_new_from_samples, codes_handle_clone, codes_handle_delete,
    codes_handle_new_from_file,
};
pub use codes_set::{codes_set_double, codes_set_double_array, codes_set_long, codes_set_string};
pub use grib_nearest::{
    codes_grib_nearest_delete, codes_grib_nearest_find, codes_grib_nearest_new,
};

#[cfg(target_os = "macos")]
type _SYS_IO_FILE = eccodes_sys::__sFILE;

#[cfg(not(target_os = "macos"))]
type _SYS_IO_FILE = eccodes_sys::_IO_FILE;

/// Converts the code returned by an ecCodes function into `Result`.
pub(crate) fn error_code_to_result(error_code: i32) -> Result<(), CodesError> {
    if error_code == 0 {
        return Ok(());
    }

    let err: Option<CodesInternal> = FromPrimitive::from_i32(error_code);

    match err {
        Some(err) => Err(err.into()),
        None => Err(CodesError::UnknownInternal(error_code)),
    }
}
