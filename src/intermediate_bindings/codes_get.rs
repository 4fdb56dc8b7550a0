#![allow(clippy::module_name_repetitions)]

use std::{
    ffi::{CStr, CString},
    ptr, slice,
};

use eccodes_sys::codes_handle;
use libc::{c_char, c_void};

use crate::{errors::CodesError, pointer_guard};

use super::error_code_to_result;

pub unsafe fn codes_get_size(handle: *mut codes_handle, key: &str) -> Result<usize, CodesError> {
    pointer_guard::non_null!(handle);

    let key = CString::new(key)?;
    let mut key_size: usize = 0;

    let error_code = eccodes_sys::codes_get_size(handle, key.as_ptr(), &mut key_size);
    error_code_to_result(error_code)?;

    Ok(key_size)
}

pub unsafe fn codes_get_length(handle: *mut codes_handle, key: &str) -> Result<usize, CodesError> {
    pointer_guard::non_null!(handle);

    let key = CString::new(key)?;
    let mut key_length: usize = 0;

    let error_code = eccodes_sys::codes_get_length(handle, key.as_ptr(), &mut key_length);
    error_code_to_result(error_code)?;

    Ok(key_length)
}

pub unsafe fn codes_is_defined(handle: *mut codes_handle, key: &str) -> Result<bool, CodesError> {
    pointer_guard::non_null!(handle);

    let key = CString::new(key)?;

    Ok(eccodes_sys::codes_is_defined(handle, key.as_ptr()) != 0)
}

pub unsafe fn codes_get_long(handle: *mut codes_handle, key: &str) -> Result<i64, CodesError> {
    pointer_guard::non_null!(handle);

    let key = CString::new(key)?;
    let mut key_value: i64 = 0;

    let error_code = eccodes_sys::codes_get_long(handle, key.as_ptr(), &mut key_value);
    error_code_to_result(error_code)?;

    Ok(key_value)
}

pub unsafe fn codes_get_double(handle: *mut codes_handle, key: &str) -> Result<f64, CodesError> {
    pointer_guard::non_null!(handle);

    let key = CString::new(key)?;
    let mut key_value: f64 = 0.0;

    let error_code = eccodes_sys::codes_get_double(handle, key.as_ptr(), &mut key_value);
    error_code_to_result(error_code)?;

    Ok(key_value)
}

pub unsafe fn codes_get_double_array(
    handle: *mut codes_handle,
    key: &str,
) -> Result<Vec<f64>, CodesError> {
    pointer_guard::non_null!(handle);

    let mut key_size = codes_get_size(handle, key)?;
    if key_size < 1 {
        return Err(CodesError::IncorrectKeySize(key.to_owned()));
    }
    let key = CString::new(key)?;

    let mut key_values: Vec<f64> = vec![0.0; key_size];

    let error_code = eccodes_sys::codes_get_double_array(
        handle,
        key.as_ptr(),
        key_values.as_mut_ptr(),
        &mut key_size,
    );
    error_code_to_result(error_code)?;

    key_values.truncate(key_size);

    Ok(key_values)
}

pub unsafe fn codes_get_string(handle: *mut codes_handle, key: &str) -> Result<String, CodesError> {
    pointer_guard::non_null!(handle);

    let mut key_length = codes_get_length(handle, key)?;
    let key = CString::new(key)?;

    let mut key_message: Vec<u8> = vec![0; key_length];

    let error_code = eccodes_sys::codes_get_string(
        handle,
        key.as_ptr(),
        key_message.as_mut_ptr().cast::<c_char>(),
        &mut key_length,
    );
    error_code_to_result(error_code)?;

    key_message.truncate(key_length);

    // some keys are returned without the terminating nul
    let key_message_cstr = match CStr::from_bytes_until_nul(&key_message) {
        Ok(cstr) => cstr.to_owned(),
        Err(_) => {
            key_message.push(0);
            CStr::from_bytes_with_nul(&key_message)?.to_owned()
        }
    };

    Ok(key_message_cstr.to_str()?.to_owned())
}

/// Copies the encoded message out of ecCodes.
///
/// ecCodes keeps ownership of the buffer it points to, so the bytes
/// are copied before the handle can be modified again.
pub unsafe fn codes_get_message(handle: *mut codes_handle) -> Result<Vec<u8>, CodesError> {
    pointer_guard::non_null!(handle);

    let mut buffer_ptr: *const c_void = ptr::null();
    let mut message_size: usize = 0;

    let error_code = eccodes_sys::codes_get_message(handle, &mut buffer_ptr, &mut message_size);
    error_code_to_result(error_code)?;

    pointer_guard::non_null!(buffer_ptr);

    Ok(slice::from_raw_parts(buffer_ptr.cast::<u8>(), message_size).to_vec())
}
