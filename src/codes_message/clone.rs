use crate::{errors::CodesError, intermediate_bindings::codes_handle_clone, GribMessage};

impl GribMessage {
    /// Custom function to clone the `GribMessage`.
    ///
    /// **Be careful of the memory overhead!** This function reads the whole
    /// message into the memory, which can be of a significant size for big grids.
    ///
    /// # Errors
    /// This function will return [`CodesError::CloneFailed`] if ecCodes fails to clone the message.
    pub fn try_clone(&self) -> Result<GribMessage, CodesError> {
        Ok(GribMessage::new(unsafe {
            codes_handle_clone(self.message_handle)?
        }))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::{GribMessage, KeyRead, KeyWrite};

    #[test]
    fn clone_is_independent() -> Result<()> {
        let mut original = GribMessage::from_sample("regular_ll_sfc_grib2")?;
        original.write_key("forecastTime", 3_i64)?;

        let mut cloned = original.try_clone()?;
        assert_ne!(original.message_handle, cloned.message_handle);

        cloned.write_key("forecastTime", 9_i64)?;
        drop(original);

        let step: i64 = cloned.read_key("forecastTime")?;
        assert_eq!(step, 9);

        Ok(())
    }
}
