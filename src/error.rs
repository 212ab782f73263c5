//! Errors reported to C callers through `out_error` parameters.

use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use crate::interop::StringConversionError;

/// Opaque error type for C callers.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct basicmodule_error_t;

/// Category of an error, so callers can branch without parsing the message.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(C)]
pub enum basicmodule_error_code_t {
    BASICMODULE_ERROR_CODE_NONE = 0,
    BASICMODULE_ERROR_CODE_NULL_POINTER = 1,
    BASICMODULE_ERROR_CODE_INVALID_UTF8 = 2,
    BASICMODULE_ERROR_CODE_INTERIOR_NUL = 3,
    BASICMODULE_ERROR_CODE_PANIC = 4,
    BASICMODULE_ERROR_CODE_LOGGING = 5,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum BasicModuleError {
    #[error("{field}: {source}")]
    Argument {
        field: &'static str,
        source: StringConversionError,
    },
    #[error(transparent)]
    Conversion(#[from] StringConversionError),
    #[error("panic in {0}")]
    Panic(&'static str),
    #[error("{0}")]
    Logging(String),
}

impl BasicModuleError {
    fn code(&self) -> basicmodule_error_code_t {
        use basicmodule_error_code_t::*;
        match self {
            Self::Argument { source, .. } | Self::Conversion(source) => match source {
                StringConversionError::NullPointer => BASICMODULE_ERROR_CODE_NULL_POINTER,
                StringConversionError::InvalidUtf8 => BASICMODULE_ERROR_CODE_INVALID_UTF8,
                StringConversionError::InteriorNul { .. } => BASICMODULE_ERROR_CODE_INTERIOR_NUL,
            },
            Self::Panic(_) => BASICMODULE_ERROR_CODE_PANIC,
            Self::Logging(_) => BASICMODULE_ERROR_CODE_LOGGING,
        }
    }
}

struct ErrorHandle {
    code: basicmodule_error_code_t,
    message: CString,
}

impl From<BasicModuleError> for ErrorHandle {
    fn from(err: BasicModuleError) -> Self {
        Self {
            code: err.code(),
            message: cstring_from_str_lossy(&err.to_string()),
        }
    }
}

fn handle<'a>(error: *const basicmodule_error_t) -> Option<&'a ErrorHandle> {
    // Safety: error is null or a live handle allocated by `report`.
    unsafe { (error as *const ErrorHandle).as_ref() }
}

pub(crate) fn cstring_from_str_lossy(value: &str) -> CString {
    match CString::new(value) {
        Ok(value) => value,
        Err(err) => {
            let mut bytes = err.into_vec();
            for byte in bytes.iter_mut().filter(|byte| **byte == 0) {
                *byte = b' ';
            }
            // Every NUL was replaced above.
            CString::new(bytes).unwrap_or_default()
        }
    }
}

pub(crate) fn clear_error(out_error: *mut *mut basicmodule_error_t) {
    // Safety: out_error is null or writable.
    if let Some(slot) = unsafe { out_error.as_mut() } {
        *slot = ptr::null_mut();
    }
}

/// Stores `err` in `out_error`. A null `out_error` discards it.
pub(crate) fn report(out_error: *mut *mut basicmodule_error_t, err: impl Into<BasicModuleError>) {
    // Safety: out_error is null or writable.
    if let Some(slot) = unsafe { out_error.as_mut() } {
        let handle = Box::new(ErrorHandle::from(err.into()));
        *slot = Box::into_raw(handle).cast();
    }
}

/// Returns the message for an error allocated by basicmodule.
///
/// The returned pointer is valid as long as the error handle is alive.
#[unsafe(no_mangle)]
pub extern "C" fn basicmodule_error_message(error: *const basicmodule_error_t) -> *const c_char {
    handle(error).map_or(ptr::null(), |handle| handle.message.as_ptr())
}

/// Returns the category of an error, or `BASICMODULE_ERROR_CODE_NONE` for null.
#[unsafe(no_mangle)]
pub extern "C" fn basicmodule_error_code(
    error: *const basicmodule_error_t,
) -> basicmodule_error_code_t {
    handle(error).map_or(basicmodule_error_code_t::BASICMODULE_ERROR_CODE_NONE, |handle| {
        handle.code
    })
}

/// Frees an error returned by basicmodule.
#[unsafe(no_mangle)]
pub extern "C" fn basicmodule_error_free(error: *mut basicmodule_error_t) {
    if !error.is_null() {
        // Safety: error is a handle allocated by `report` and not yet freed.
        drop(unsafe { Box::from_raw(error.cast::<ErrorHandle>()) });
    }
}

/// Frees a string returned by basicmodule, including the result of `stringMethod`.
#[unsafe(no_mangle)]
pub extern "C" fn basicmodule_string_free(value: *mut c_char) {
    if !value.is_null() {
        // Safety: value came from `CString::into_raw` in this library.
        drop(unsafe { CString::from_raw(value) });
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;
    use super::basicmodule_error_code_t::*;

    fn message(error: *const basicmodule_error_t) -> &'static str {
        unsafe { CStr::from_ptr(basicmodule_error_message(error)) }
            .to_str()
            .unwrap()
    }

    #[test]
    fn test_report_argument_error() {
        let mut error: *mut basicmodule_error_t = ptr::null_mut();
        report(
            &mut error,
            BasicModuleError::Argument {
                field: "arg",
                source: StringConversionError::InvalidUtf8,
            },
        );
        assert!(!error.is_null());
        assert_eq!(message(error), "arg: string was not valid UTF-8");
        assert_eq!(basicmodule_error_code(error), BASICMODULE_ERROR_CODE_INVALID_UTF8);

        basicmodule_error_free(error);
        clear_error(&mut error);
        assert!(error.is_null());
    }

    #[test]
    fn test_report_converts_string_errors() {
        let mut error: *mut basicmodule_error_t = ptr::null_mut();
        report(&mut error, StringConversionError::InteriorNul { position: 4 });
        assert_eq!(message(error), "string contained a null byte at position 4");
        assert_eq!(basicmodule_error_code(error), BASICMODULE_ERROR_CODE_INTERIOR_NUL);
        basicmodule_error_free(error);
    }

    #[test]
    fn test_codes_for_panic_and_logging() {
        assert_eq!(BasicModuleError::Panic("op").code(), BASICMODULE_ERROR_CODE_PANIC);
        assert_eq!(
            BasicModuleError::Logging("bad".into()).code(),
            BASICMODULE_ERROR_CODE_LOGGING
        );
        assert_eq!(
            BasicModuleError::Conversion(StringConversionError::NullPointer).code(),
            BASICMODULE_ERROR_CODE_NULL_POINTER
        );
    }

    #[test]
    fn test_null_handles_are_ignored() {
        report(ptr::null_mut(), BasicModuleError::Panic("nobody is listening"));
        clear_error(ptr::null_mut());
        assert!(basicmodule_error_message(ptr::null()).is_null());
        assert_eq!(basicmodule_error_code(ptr::null()), BASICMODULE_ERROR_CODE_NONE);
        basicmodule_error_free(ptr::null_mut());
        basicmodule_string_free(ptr::null_mut());
    }

    #[test]
    fn test_cstring_from_str_lossy_replaces_nul() {
        assert_eq!(cstring_from_str_lossy("a\0b\0").as_bytes(), b"a b ");
        assert_eq!(cstring_from_str_lossy("plain").as_bytes(), b"plain");
    }
}
