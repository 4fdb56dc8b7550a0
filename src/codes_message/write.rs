use std::{fs::OpenOptions, io::Write, path::Path};

use crate::{
    errors::CodesError,
    intermediate_bindings::{
        codes_get_message, codes_set_double, codes_set_double_array, codes_set_long,
        codes_set_string,
    },
    GribMessage,
};

/// Provides GRIB key writing capabilites. Implemented by [`GribMessage`] for all key types
/// used by this crate.
pub trait KeyWrite<T> {
    /// Writes key with given name and value to [`GribMessage`] overwriting existing value, unless
    /// the key is read-only. This function directly calls ecCodes ensuring only type and memory safety.
    ///
    /// Returns the message, so several writes can be chained.
    ///
    /// # Example
    ///
    /// ```
    ///  # use nwgd::{GribMessage, KeyRead, KeyWrite};
    ///  # fn main() -> anyhow::Result<()> {
    ///  let mut message = GribMessage::from_sample("regular_ll_sfc_grib2")?;
    ///  message
    ///      .write_key("dataDate", 20240319_i64)?
    ///      .write_key("dataTime", 2000_i64)?;
    ///
    ///  let date: i64 = message.read_key("dataDate")?;
    ///  assert_eq!(date, 20240319);
    ///  # Ok(())
    ///  # }
    /// ```
    ///
    /// # Errors
    ///
    /// This function will return [`CodesInternal`](crate::errors::CodesInternal) if ecCodes fails to write the key.
    fn write_key(&mut self, name: &str, value: T) -> Result<&mut Self, CodesError>;
}

macro_rules! impl_key_write {
    ($ec_func:ident, $gen_type:ty) => {
        impl KeyWrite<$gen_type> for GribMessage {
            fn write_key(&mut self, name: &str, value: $gen_type) -> Result<&mut Self, CodesError> {
                unsafe {
                    $ec_func(self.message_handle, name, value)?;
                }
                Ok(self)
            }
        }
    };
}

impl_key_write!(codes_set_long, i64);
impl_key_write!(codes_set_double, f64);
impl_key_write!(codes_set_double_array, &[f64]);
impl_key_write!(codes_set_string, &str);

impl GribMessage {
    /// Encodes the message and returns its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodesInternal`](crate::errors::CodesInternal)
    /// when ecCodes cannot encode the message.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodesError> {
        unsafe { codes_get_message(self.message_handle) }
    }

    /// Encodes the message and writes it to given writer.
    ///
    /// # Errors
    ///
    /// Returns [`CodesError::FileHandlingInterrupted`] when the writer fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), CodesError> {
        let buf = self.to_bytes()?;
        writer.write_all(&buf)?;

        Ok(())
    }

    /// Function to write the message to a file at provided path.
    /// If file does not exists it will be created.
    /// If `append` is set to `true` file will be opened in append mode
    /// and no data will be overwritten (useful when writing mutiple messages to one file).
    ///
    /// # Errors
    ///
    /// Returns [`CodesError::FileHandlingInterrupted`] when the file cannot be opened,
    /// created or correctly written.
    ///
    /// Returns [`CodesInternal`](crate::errors::CodesInternal)
    /// when internal ecCodes function returns non-zero code.
    pub fn write_to_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        append: bool,
    ) -> Result<(), CodesError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(file_path)?;

        self.write_to(&mut file)
    }
}
