//! Native library for the basic-module React Native module.
//!
//! The C ABI re-exported here is what `libbasicmodule.h` declares. The pure Rust
//! behavior lives in [`module`] so it can be exercised without crossing the
//! boundary.

#[cfg(target_os = "android")]
mod android;
mod error;
mod ffi;
pub mod interop;
mod logging;
mod methods;
pub mod module;

pub use error::{
    basicmodule_error_code, basicmodule_error_code_t, basicmodule_error_free,
    basicmodule_error_message, basicmodule_error_t, basicmodule_string_free,
};
pub use logging::{
    basicmodule_log_callback_t, basicmodule_log_config_init, basicmodule_log_config_t,
    basicmodule_log_init, basicmodule_log_level_t, basicmodule_log_record_t,
};
pub use methods::{
    basicmodule_string_method, basicmodule_version, booleanMethod, numericMethod, stringMethod,
};
