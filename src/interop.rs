//! Conversions between Rust strings and NUL-terminated C strings.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StringConversionError {
    #[error("string pointer was null")]
    NullPointer,
    #[error("string was not valid UTF-8")]
    InvalidUtf8,
    #[error("string contained a null byte at position {position}")]
    InteriorNul { position: usize },
}

pub trait ToNativeString {
    /// Allocates a C copy of the string. Ownership passes to the caller.
    fn to_native(&self) -> Result<*mut c_char, StringConversionError>;
}

pub trait FromNativeString: Sized {
    fn from_native(native: *const c_char) -> Result<Self, StringConversionError>;
}

impl ToNativeString for str {
    fn to_native(&self) -> Result<*mut c_char, StringConversionError> {
        let c_string = CString::new(self).map_err(|err| StringConversionError::InteriorNul {
            position: err.nul_position(),
        })?;
        Ok(c_string.into_raw())
    }
}

impl ToNativeString for String {
    fn to_native(&self) -> Result<*mut c_char, StringConversionError> {
        self.as_str().to_native()
    }
}

impl FromNativeString for String {
    fn from_native(native: *const c_char) -> Result<Self, StringConversionError> {
        if native.is_null() {
            return Err(StringConversionError::NullPointer);
        }
        // Safety: caller guarantees a valid, NUL-terminated C string.
        let cstr = unsafe { CStr::from_ptr(native) };
        cstr.to_str()
            .map(str::to_owned)
            .map_err(|_| StringConversionError::InvalidUtf8)
    }
}
