//! C entry points declared by `libbasicmodule.h`.

use std::os::raw::{c_char, c_double};
use std::ptr;

use crate::error::{basicmodule_error_t, clear_error, report};
use crate::ffi::{catch_panic, read_cstr};
use crate::interop::ToNativeString;
use crate::module;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "C" fn numericMethod(arg: c_double) -> c_double {
    log::trace!(target: "basicmodule", "numericMethod({arg})");
    module::numeric_method(arg)
}

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "C" fn booleanMethod(arg: bool) -> bool {
    log::trace!(target: "basicmodule", "booleanMethod({arg})");
    module::boolean_method(arg)
}

/// Returns a copy of `arg`, or null if `arg` is null or not valid UTF-8.
///
/// The returned string is heap-allocated and must be freed with `basicmodule_string_free`.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "C" fn stringMethod(arg: *const c_char) -> *const c_char {
    basicmodule_string_method(arg, ptr::null_mut())
}

/// Same as `stringMethod`, reporting failures through `out_error`.
///
/// The returned string is heap-allocated and must be freed with `basicmodule_string_free`.
#[unsafe(no_mangle)]
pub extern "C" fn basicmodule_string_method(
    arg: *const c_char,
    out_error: *mut *mut basicmodule_error_t,
) -> *mut c_char {
    clear_error(out_error);
    let arg = match read_cstr(arg, "arg", out_error) {
        Some(value) => value,
        None => return ptr::null_mut(),
    };
    log::trace!(target: "basicmodule", "stringMethod({arg:?})");

    let result = catch_panic("stringMethod", out_error, || {
        module::string_method(arg).to_native()
    });

    match result {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            log::warn!(target: "basicmodule", "stringMethod failed: {err}");
            report(out_error, err);
            ptr::null_mut()
        }
        None => ptr::null_mut(),
    }
}

/// Returns the library version. The string is static and must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn basicmodule_version() -> *const c_char {
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use std::ffi::{CStr, CString};

    use super::*;
    use crate::error::{basicmodule_error_free, basicmodule_error_message, basicmodule_string_free};

    #[test]
    fn test_scalar_methods() {
        assert_eq!(numericMethod(42.25), 42.25);
        assert_eq!(numericMethod(-0.0).to_bits(), (-0.0f64).to_bits());
        assert!(booleanMethod(true));
        assert!(!booleanMethod(false));
    }

    #[test]
    fn test_string_method_returns_owned_copy() {
        let input = CString::new("basic module").unwrap();
        let output = stringMethod(input.as_ptr());
        assert!(!output.is_null());
        assert_ne!(output, input.as_ptr());

        let value = unsafe { CStr::from_ptr(output) };
        assert_eq!(value.to_str().unwrap(), "basic module");
        basicmodule_string_free(output as *mut c_char);
    }

    #[test]
    fn test_string_method_null_input() {
        assert!(stringMethod(ptr::null()).is_null());
    }

    #[test]
    fn test_string_method_invalid_utf8_sets_error() {
        let input = CString::new(vec![0xc3, 0x28]).unwrap();
        let mut error = ptr::null_mut();
        let output = basicmodule_string_method(input.as_ptr(), &mut error);
        assert!(output.is_null());
        assert!(!error.is_null());

        let message = unsafe { CStr::from_ptr(basicmodule_error_message(error)) };
        assert_eq!(message.to_str().unwrap(), "arg: string was not valid UTF-8");
        basicmodule_error_free(error);
    }

    #[test]
    fn test_version() {
        let version = unsafe { CStr::from_ptr(basicmodule_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
