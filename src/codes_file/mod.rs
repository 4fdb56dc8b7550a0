//! Definition and constructors of `GribFile`
//! used for accessing GRIB files

use crate::{
    errors::CodesError, intermediate_bindings::codes_handle_new_from_file, GribMessage,
};
use eccodes_sys::codes_handle;
use errno::errno;
use fallible_iterator::FallibleIterator;
use libc::{c_char, FILE};
use std::{
    fmt::Debug,
    fs::{File, OpenOptions},
    os::unix::prelude::{AsRawFd, IntoRawFd},
    path::{Path, PathBuf},
};
use tracing::{event, instrument, Level};

pub use iterator::MessageIter;

mod iterator;

/// Structure providing access to the GRIB file which takes a full ownership of the accessed file.
///
/// To access GRIB messages the ecCodes library uses a method similar to a C-style iterator.
/// It digests the `* FILE` multiple times, each time returning the `*mut codes_handle`
/// to a message inside the file. Use [`messages()`](GribFile::messages) to walk them.
///
/// Every message read from the file holds its own copy of the encoded data,
/// so [`GribMessage`]s may outlive the `GribFile` they were read from.
#[derive(Debug)]
pub struct GribFile {
    pointer: *mut FILE,
    path: PathBuf,
}

impl GribFile {
    /// Opens the GRIB file at given path.
    ///
    /// The function creates [`fs::File`](std::fs::File) from provided path and utilises
    /// [`fdopen()`](https://man7.org/linux/man-pages/man3/fdopen.3.html)
    /// to associate the file descriptor with a `libc::FILE` stream for ecCodes.
    ///
    /// ## Errors
    /// Returns [`CodesError::FileHandlingInterrupted`] when the file cannot be opened.
    ///
    /// Returns [`CodesError::LibcNonZero`] with [`errno`](errno::Errno) information
    /// when the stream cannot be created from the file descriptor.
    #[instrument(level = "trace")]
    pub fn open<P: AsRef<Path> + Debug>(file_path: P) -> Result<Self, CodesError> {
        let file = OpenOptions::new().read(true).open(file_path.as_ref())?;
        let file_pointer = open_with_fdopen(&file)?;

        // the stream owns the descriptor from now on and closes it in drop
        let _fd = file.into_raw_fd();

        Ok(Self {
            pointer: file_pointer,
            path: file_path.as_ref().to_path_buf(),
        })
    }

    /// Path this file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every message of the file at given path, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or one of the messages
    /// cannot be decoded by ecCodes.
    pub fn read_all<P: AsRef<Path> + Debug>(file_path: P) -> Result<Vec<GribMessage>, CodesError> {
        let mut file = Self::open(file_path)?;
        let messages = file.messages().collect()?;

        Ok(messages)
    }

    fn generate_codes_handle(&mut self) -> Result<*mut codes_handle, CodesError> {
        unsafe { codes_handle_new_from_file(self.pointer) }
    }
}

impl Drop for GribFile {
    /// Closes the stream with `fclose()`.
    ///
    /// # Panics
    ///
    /// In debug mode when `fclose()` fails.
    #[instrument(level = "trace")]
    fn drop(&mut self) {
        if self.pointer.is_null() {
            return;
        }

        let error_code = unsafe { libc::fclose(self.pointer) };

        if error_code != 0 {
            let error_val = errno();
            event!(
                Level::ERROR,
                "fclose() returned an error for {:?}: {} ({})",
                self.path,
                error_val.0,
                error_val
            );
            debug_assert!(false, "Error in GribFile::drop");
        }

        self.pointer = std::ptr::null_mut();
    }
}

#[instrument(level = "trace")]
fn open_with_fdopen(file: &File) -> Result<*mut FILE, CodesError> {
    let mode = b"r\0";
    let file_ptr = unsafe { libc::fdopen(file.as_raw_fd(), mode.as_ptr().cast::<c_char>()) };

    if file_ptr.is_null() {
        let error_val = errno();
        let error_code = error_val.0;
        return Err(CodesError::LibcNonZero(error_code, error_val));
    }

    Ok(file_ptr)
}
