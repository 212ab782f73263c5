//! Shared utilities for basicmodule's C FFI bindings.

use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{BasicModuleError, basicmodule_error_t, report};
use crate::interop::FromNativeString;

pub(crate) fn read_cstr(
    value: *const c_char,
    field: &'static str,
    out_error: *mut *mut basicmodule_error_t,
) -> Option<String> {
    match String::from_native(value) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!(target: "basicmodule", "rejected {field}: {err}");
            report(out_error, BasicModuleError::Argument { field, source: err });
            None
        }
    }
}

/// Runs `f`, turning a panic into an error on `out_error`.
pub(crate) fn catch_panic<T>(
    operation: &'static str,
    out_error: *mut *mut basicmodule_error_t,
    f: impl FnOnce() -> T,
) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            log::error!(target: "basicmodule", "panic in {operation}");
            report(out_error, BasicModuleError::Panic(operation));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::{CStr, CString};
    use std::ptr;

    use super::*;
    use crate::error::{
        basicmodule_error_code, basicmodule_error_code_t, basicmodule_error_free,
        basicmodule_error_message,
    };

    fn take_message(error: *mut basicmodule_error_t) -> String {
        assert!(!error.is_null());
        let message = unsafe { CStr::from_ptr(basicmodule_error_message(error)) }
            .to_string_lossy()
            .into_owned();
        basicmodule_error_free(error);
        message
    }

    #[test]
    fn test_read_cstr() {
        let value = CString::new("payload").unwrap();
        let mut error = ptr::null_mut();
        assert_eq!(
            read_cstr(value.as_ptr(), "arg", &mut error).as_deref(),
            Some("payload")
        );
        assert!(error.is_null());
    }

    #[test]
    fn test_read_cstr_null_reports_field() {
        let mut error = ptr::null_mut();
        assert!(read_cstr(ptr::null(), "arg", &mut error).is_none());
        assert_eq!(take_message(error), "arg: string pointer was null");
    }

    #[test]
    fn test_catch_panic() {
        let mut error = ptr::null_mut();
        assert_eq!(catch_panic("add", &mut error, || 1 + 1), Some(2));
        assert!(error.is_null());

        let result: Option<()> = catch_panic("explode", &mut error, || panic!("boom"));
        assert!(result.is_none());
        assert_eq!(
            basicmodule_error_code(error),
            basicmodule_error_code_t::BASICMODULE_ERROR_CODE_PANIC
        );
        assert_eq!(take_message(error), "panic in explode");
    }

    #[test]
    fn test_catch_panic_without_out_error() {
        let result: Option<u8> = catch_panic("jni", ptr::null_mut(), || panic!("unwinding"));
        assert!(result.is_none());
    }
}
