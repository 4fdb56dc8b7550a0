use fallible_iterator::FallibleIterator;

use crate::{errors::CodesError, GribFile, GribMessage};

/// Iterator over messages in `GribFile`.
///
/// This structure implements [`FallibleIterator`], so reading a message that
/// ecCodes cannot decode ends the iteration with an error instead of a panic.
///
/// Creating this iter requires `GribFile` to be mutable, because every call
/// to `next()` advances the underlying stream.
///
/// ## Example
///
/// ```no_run
/// use nwgd::{FallibleIterator, GribFile, KeyRead};
/// #
/// # fn main() -> anyhow::Result<()> {
/// let mut file = GribFile::open("./sample/template.GRB2")?;
/// let mut messages = file.messages();
///
/// while let Some(msg) = messages.next()? {
///     let step: i64 = msg.read_key("forecastTime")?;
///     println!("message for forecast time {step}");
/// }
/// #     Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MessageIter<'a> {
    grib_file: &'a mut GribFile,
}

impl GribFile {
    /// Generates [`MessageIter`] that reads the remaining messages of the file.
    pub fn messages(&mut self) -> MessageIter<'_> {
        MessageIter { grib_file: self }
    }
}

impl FallibleIterator for MessageIter<'_> {
    type Item = GribMessage;
    type Error = CodesError;

    /// # Errors
    ///
    /// The method will return [`CodesInternal`](crate::errors::CodesInternal)
    /// when internal ecCodes function returns non-zero code.
    fn next(&mut self) -> Result<Option<Self::Item>, Self::Error> {
        let eccodes_handle = self.grib_file.generate_codes_handle()?;

        if eccodes_handle.is_null() {
            Ok(None)
        } else {
            Ok(Some(GribMessage::new(eccodes_handle)))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{test_support::write_test_grib, FallibleIterator, GribFile, KeyRead};
    use anyhow::{Context, Result};

    #[test]
    fn messages_in_file_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_test_grib(dir.path(), "steps.grib2", &[3, 4, 5])?;

        let mut file = GribFile::open(&path)?;
        let mut steps = Vec::new();

        let mut messages = file.messages();
        while let Some(msg) = messages.next()? {
            let step: i64 = msg.read_key("forecastTime")?;
            steps.push(step);
        }

        assert_eq!(steps, vec![3, 4, 5]);

        Ok(())
    }

    #[test]
    fn message_outlives_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_test_grib(dir.path(), "steps.grib2", &[7])?;

        let mut file = GribFile::open(&path)?;
        let msg = file.messages().next()?.context("Message not some")?;
        drop(file);

        let step: i64 = msg.read_key("forecastTime")?;
        assert_eq!(step, 7);

        Ok(())
    }

    #[test]
    fn exhausted_iterator_returns_none() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_test_grib(dir.path(), "single.grib2", &[0])?;

        let mut file = GribFile::open(&path)?;
        let mut messages = file.messages();

        assert!(messages.next()?.is_some());
        assert!(messages.next()?.is_none());

        Ok(())
    }
}
