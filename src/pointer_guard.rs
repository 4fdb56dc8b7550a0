/// Returns [`CodesError::NullPtr`](crate::errors::CodesError::NullPtr) from the
/// enclosing function when given pointer is null.
macro_rules! non_null {
    ($ptr:expr) => {
        if $ptr.is_null() {
            debug_assert!(false, "Null pointer encountered");
            return Err($crate::errors::CodesError::NullPtr);
        }
    };
}
pub(crate) use non_null;
