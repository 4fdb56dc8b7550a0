#![allow(clippy::module_name_repetitions)]

use std::ffi::CString;

use eccodes_sys::codes_handle;

use crate::{errors::CodesError, pointer_guard};

use super::error_code_to_result;

pub unsafe fn codes_set_long(
    handle: *mut codes_handle,
    key: &str,
    value: i64,
) -> Result<(), CodesError> {
    pointer_guard::non_null!(handle);

    let key = CString::new(key)?;

    let error_code = eccodes_sys::codes_set_long(handle, key.as_ptr(), value);
    error_code_to_result(error_code)
}

pub unsafe fn codes_set_double(
    handle: *mut codes_handle,
    key: &str,
    value: f64,
) -> Result<(), CodesError> {
    pointer_guard::non_null!(handle);

    let key = CString::new(key)?;

    let error_code = eccodes_sys::codes_set_double(handle, key.as_ptr(), value);
    error_code_to_result(error_code)
}

pub unsafe fn codes_set_double_array(
    handle: *mut codes_handle,
    key: &str,
    values: &[f64],
) -> Result<(), CodesError> {
    pointer_guard::non_null!(handle);

    let key = CString::new(key)?;

    let error_code =
        eccodes_sys::codes_set_double_array(handle, key.as_ptr(), values.as_ptr(), values.len());
    error_code_to_result(error_code)
}

pub unsafe fn codes_set_string(
    handle: *mut codes_handle,
    key: &str,
    value: &str,
) -> Result<(), CodesError> {
    pointer_guard::non_null!(handle);

    let key = CString::new(key)?;
    let mut length = value.len();
    let value = CString::new(value)?;

    let error_code =
        eccodes_sys::codes_set_string(handle, key.as_ptr(), value.as_ptr(), &mut length);
    error_code_to_result(error_code)
}
