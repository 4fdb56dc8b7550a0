use std::{ffi::CString, ptr};

use eccodes_sys::{codes_context, codes_handle, ProductKind_PRODUCT_GRIB};
use libc::FILE;
use tracing::instrument;

use crate::{errors::CodesError, pointer_guard};

use super::{error_code_to_result, _SYS_IO_FILE};

/// Reads the next GRIB message from the stream.
/// Returns a null pointer when there are no messages left.
#[instrument(level = "trace")]
pub unsafe fn codes_handle_new_from_file(
    file_pointer: *mut FILE,
) -> Result<*mut codes_handle, CodesError> {
    pointer_guard::non_null!(file_pointer);

    let context: *mut codes_context = ptr::null_mut(); //default context

    let mut error_code: i32 = 0;

    let file_handle = eccodes_sys::codes_handle_new_from_file(
        context,
        file_pointer.cast::<_SYS_IO_FILE>(),
        ProductKind_PRODUCT_GRIB,
        &mut error_code,
    );
    error_code_to_result(error_code)?;

    Ok(file_handle)
}

#[instrument(level = "trace")]
pub unsafe fn codes_grib_handle_new_from_samples(
    sample_name: &str,
) -> Result<*mut codes_handle, CodesError> {
    let context: *mut codes_context = ptr::null_mut();
    let name = CString::new(sample_name)?;

    let handle = eccodes_sys::codes_grib_handle_new_from_samples(context, name.as_ptr());

    if handle.is_null() {
        return Err(CodesError::MissingSample(sample_name.to_owned()));
    }

    Ok(handle)
}

pub unsafe fn codes_handle_delete(handle: *mut codes_handle) -> Result<(), CodesError> {
    if handle.is_null() {
        return Ok(());
    }

    let error_code = eccodes_sys::codes_handle_delete(handle);
    error_code_to_result(error_code)
}

pub unsafe fn codes_handle_clone(
    source_handle: *mut codes_handle,
) -> Result<*mut codes_handle, CodesError> {
    pointer_guard::non_null!(source_handle);

    let clone_handle = eccodes_sys::codes_handle_clone(source_handle);

    if clone_handle.is_null() {
        return Err(CodesError::CloneFailed);
    }

    Ok(clone_handle)
}
