use crate::{
    errors::CodesError,
    intermediate_bindings::{
        codes_get_double, codes_get_double_array, codes_get_long, codes_get_string,
    },
    GribMessage,
};

/// Provides GRIB key reading capabilites. Implemented by [`GribMessage`] for all
/// key types used by this crate.
pub trait KeyRead<T> {
    /// Reads the key with given name as the requested type.
    ///
    /// ecCodes converts between numeric types where possible, so for example
    /// `forecastTime` can be read both as `i64` and as `f64`.
    ///
    /// # Example
    ///
    /// ```no_run
    ///  # use nwgd::{GribFile, KeyRead, FallibleIterator};
    ///  # use anyhow::Context;
    ///  # fn main() -> anyhow::Result<()> {
    ///  let mut file = GribFile::open("./sample/template.GRB2")?;
    ///  let message = file.messages().next()?.context("no message")?;
    ///
    ///  let name: String = message.read_key("name")?;
    ///  let step: i64 = message.read_key("forecastTime")?;
    ///  let values: Vec<f64> = message.read_key("values")?;
    ///  # Ok(())
    ///  # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CodesNotFound`](crate::errors::CodesInternal::CodesNotFound)
    /// when a key of given name has not been found in the message.
    ///
    /// Returns [`CodesError::CstrUTF8`] when a string key is not a valid UTF-8.
    fn read_key(&self, name: &str) -> Result<T, CodesError>;
}

macro_rules! impl_key_read {
    ($ec_func:ident, $gen_type:ty) => {
        impl KeyRead<$gen_type> for GribMessage {
            fn read_key(&self, name: &str) -> Result<$gen_type, CodesError> {
                unsafe { $ec_func(self.message_handle, name) }
            }
        }
    };
}

impl_key_read!(codes_get_long, i64);
impl_key_read!(codes_get_double, f64);
impl_key_read!(codes_get_string, String);
impl_key_read!(codes_get_double_array, Vec<f64>);

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::{
        errors::{CodesError, CodesInternal},
        GribMessage, KeyRead,
    };

    #[test]
    fn key_reader() -> Result<()> {
        let msg = GribMessage::from_sample("regular_ll_sfc_grib2")?;

        let name: String = msg.read_key("name")?;
        assert!(!name.is_empty());

        let increment: f64 = msg.read_key("jDirectionIncrementInDegrees")?;
        assert!(increment > 0.0);

        let ni: i64 = msg.read_key("Ni")?;
        let nj: i64 = msg.read_key("Nj")?;
        let values: Vec<f64> = msg.read_key("values")?;
        assert_eq!(values.len() as i64, ni * nj);

        Ok(())
    }

    #[test]
    fn missing_key() -> Result<()> {
        let msg = GribMessage::from_sample("regular_ll_sfc_grib2")?;

        let missing: Result<i64, CodesError> = msg.read_key("doesNotExist");

        assert!(matches!(
            missing,
            Err(CodesError::Internal(CodesInternal::CodesNotFound))
        ));

        Ok(())
    }

    #[test]
    fn nul_in_key_name() -> Result<()> {
        let msg = GribMessage::from_sample("regular_ll_sfc_grib2")?;

        let result: Result<i64, CodesError> = msg.read_key("Ni\0Nj");

        assert!(matches!(result, Err(CodesError::NulChar(_))));

        Ok(())
    }
}
