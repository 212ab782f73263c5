//! Logging configuration for basicmodule's C bindings.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::ptr;
use std::sync::RwLock;

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::{Lazy, OnceCell};

use crate::error::{
    BasicModuleError, basicmodule_error_t, clear_error, cstring_from_str_lossy, report,
};

const DEFAULT_TARGET: &str = "basicmodule";

static LOGGER: Lazy<BasicLogger> = Lazy::new(BasicLogger::new);
static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Log level values for basicmodule logging.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(C)]
pub enum basicmodule_log_level_t {
    BASICMODULE_LOG_LEVEL_OFF = 0,
    BASICMODULE_LOG_LEVEL_ERROR = 1,
    BASICMODULE_LOG_LEVEL_WARN = 2,
    BASICMODULE_LOG_LEVEL_INFO = 3,
    BASICMODULE_LOG_LEVEL_DEBUG = 4,
    BASICMODULE_LOG_LEVEL_TRACE = 5,
}

impl From<basicmodule_log_level_t> for LevelFilter {
    fn from(value: basicmodule_log_level_t) -> Self {
        use basicmodule_log_level_t::*;
        match value {
            BASICMODULE_LOG_LEVEL_OFF => LevelFilter::Off,
            BASICMODULE_LOG_LEVEL_ERROR => LevelFilter::Error,
            BASICMODULE_LOG_LEVEL_WARN => LevelFilter::Warn,
            BASICMODULE_LOG_LEVEL_INFO => LevelFilter::Info,
            BASICMODULE_LOG_LEVEL_DEBUG => LevelFilter::Debug,
            BASICMODULE_LOG_LEVEL_TRACE => LevelFilter::Trace,
        }
    }
}

impl From<Level> for basicmodule_log_level_t {
    fn from(value: Level) -> Self {
        use basicmodule_log_level_t::*;
        match value {
            Level::Error => BASICMODULE_LOG_LEVEL_ERROR,
            Level::Warn => BASICMODULE_LOG_LEVEL_WARN,
            Level::Info => BASICMODULE_LOG_LEVEL_INFO,
            Level::Debug => BASICMODULE_LOG_LEVEL_DEBUG,
            Level::Trace => BASICMODULE_LOG_LEVEL_TRACE,
        }
    }
}

/// Log record delivered to a C callback.
///
/// String pointers are only valid for the duration of the callback and must not be retained.
/// `module_path` and `file` may be null. `line` is 0 when unknown.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct basicmodule_log_record_t {
    pub level: basicmodule_log_level_t,
    pub target: *const c_char,
    pub message: *const c_char,
    pub module_path: *const c_char,
    pub file: *const c_char,
    pub line: u32,
}

/// Callback invoked for each log record, from whichever thread emitted it.
#[allow(non_camel_case_types)]
pub type basicmodule_log_callback_t =
    Option<extern "C" fn(record: *const basicmodule_log_record_t, user_data: *mut c_void)>;

/// Configuration for `basicmodule_log_init`.
///
/// A non-null `filter` uses `RUST_LOG` syntax and overrides both the environment and
/// `level`. Without a filter, `RUST_LOG` is used when set, otherwise `level` applies to
/// the `basicmodule` target. A null `callback` sends records to stderr.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct basicmodule_log_config_t {
    pub level: basicmodule_log_level_t,
    pub filter: *const c_char,
    pub callback: basicmodule_log_callback_t,
    pub user_data: *mut c_void,
}

#[derive(Clone, Debug, PartialEq)]
struct Directive {
    target: String,
    level: LevelFilter,
}

#[derive(Clone, Debug, PartialEq)]
struct LogFilter {
    default: LevelFilter,
    directives: Vec<Directive>,
}

impl LogFilter {
    fn for_level(level: LevelFilter) -> Self {
        Self {
            default: LevelFilter::Off,
            directives: vec![Directive {
                target: DEFAULT_TARGET.to_string(),
                level,
            }],
        }
    }

    fn parse(spec: &str) -> Result<Self, String> {
        let mut filter = Self {
            default: LevelFilter::Off,
            directives: Vec::new(),
        };

        for directive in spec.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((target, level)) => {
                    let (target, level) = (target.trim(), level.trim());
                    if target.is_empty() {
                        return Err(format!("missing target in `{directive}`"));
                    }
                    let level =
                        parse_level(level).ok_or_else(|| format!("invalid level `{level}`"))?;
                    filter.directives.push(Directive {
                        target: target.to_string(),
                        level,
                    });
                }
                None => match parse_level(directive) {
                    Some(level) => filter.default = level,
                    None => filter.directives.push(Directive {
                        target: directive.to_string(),
                        level: LevelFilter::Trace,
                    }),
                },
            }
        }

        Ok(filter)
    }

    fn level_for(&self, target: &str) -> LevelFilter {
        self.directives
            .iter()
            .filter(|directive| target.starts_with(&directive.target))
            .max_by_key(|directive| directive.target.len())
            .map_or(self.default, |directive| directive.level)
    }

    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn max_level(&self) -> LevelFilter {
        self.directives
            .iter()
            .map(|directive| directive.level)
            .fold(self.default, Ord::max)
    }
}

#[derive(Clone, Copy)]
enum Sink {
    Stderr,
    Callback {
        callback: extern "C" fn(*const basicmodule_log_record_t, *mut c_void),
        // Stored as an address so the logger stays Send + Sync.
        user_data: usize,
    },
}

struct LoggerState {
    filter: LogFilter,
    sink: Sink,
}

struct BasicLogger {
    state: RwLock<LoggerState>,
}

impl BasicLogger {
    fn new() -> Self {
        Self {
            state: RwLock::new(LoggerState {
                filter: LogFilter::for_level(LevelFilter::Info),
                sink: Sink::Stderr,
            }),
        }
    }

    fn configure(&self, state: LoggerState) {
        let mut guard = self.state.write().unwrap_or_else(|err| err.into_inner());
        *guard = state;
    }

    fn snapshot(&self, metadata: &Metadata) -> Option<Sink> {
        let guard = self.state.read().unwrap_or_else(|err| err.into_inner());
        guard.filter.enabled(metadata).then_some(guard.sink)
    }
}

impl Log for BasicLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.snapshot(metadata).is_some()
    }

    fn log(&self, record: &Record) {
        match self.snapshot(record.metadata()) {
            None => {}
            Some(Sink::Stderr) => {
                eprintln!("{} {}: {}", record.level(), record.target(), record.args());
            }
            Some(Sink::Callback {
                callback,
                user_data,
            }) => {
                let target = cstring_from_str_lossy(record.target());
                let message = cstring_from_str_lossy(&record.args().to_string());
                let module_path = record.module_path().map(cstring_from_str_lossy);
                let file = record.file().map(cstring_from_str_lossy);
                let native = basicmodule_log_record_t {
                    level: record.level().into(),
                    target: target.as_ptr(),
                    message: message.as_ptr(),
                    module_path: module_path.as_ref().map_or(ptr::null(), |value| value.as_ptr()),
                    file: file.as_ref().map_or(ptr::null(), |value| value.as_ptr()),
                    line: record.line().unwrap_or(0),
                };
                callback(&native, user_data as *mut c_void);
            }
        }
    }

    fn flush(&self) {}
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("warning") {
        return Some(LevelFilter::Warn);
    }
    value.parse().ok()
}

/// Picks the filter: explicit `filter`, then `rust_log`, then `level` on the crate target.
fn choose_filter(
    config: Option<&basicmodule_log_config_t>,
    rust_log: Option<String>,
) -> Result<LogFilter, String> {
    let explicit = config
        .filter(|config| !config.filter.is_null())
        // Safety: caller guarantees a valid, NUL-terminated C string.
        .map(|config| unsafe { CStr::from_ptr(config.filter) }.to_string_lossy().into_owned());

    match (explicit, rust_log) {
        (Some(filter), _) => LogFilter::parse(&filter)
            .map_err(|err| format!("invalid log filter `{filter}`: {err}")),
        (None, Some(filter)) => LogFilter::parse(&filter)
            .map_err(|err| format!("invalid RUST_LOG value `{filter}`: {err}")),
        (None, None) => Ok(LogFilter::for_level(
            config
                .map_or(basicmodule_log_level_t::BASICMODULE_LOG_LEVEL_INFO, |config| config.level)
                .into(),
        )),
    }
}

fn resolve_filter(config: Option<&basicmodule_log_config_t>) -> Result<LogFilter, String> {
    choose_filter(config, std::env::var("RUST_LOG").ok())
}

fn install_logger() -> bool {
    *INSTALLED.get_or_init(|| log::set_logger(&*LOGGER).is_ok())
}

/// Fills `config` with defaults: INFO for basicmodule, no filter and no callback.
#[unsafe(no_mangle)]
pub extern "C" fn basicmodule_log_config_init(config: *mut basicmodule_log_config_t) {
    if config.is_null() {
        return;
    }
    // Safety: caller provided a writable config pointer.
    unsafe {
        *config = basicmodule_log_config_t {
            level: basicmodule_log_level_t::BASICMODULE_LOG_LEVEL_INFO,
            filter: ptr::null(),
            callback: None,
            user_data: ptr::null_mut(),
        };
    }
}

/// Initializes logging for basicmodule.
///
/// A null `config` selects the defaults. Calling this again replaces the configuration.
#[unsafe(no_mangle)]
pub extern "C" fn basicmodule_log_init(
    config: *const basicmodule_log_config_t,
    out_error: *mut *mut basicmodule_error_t,
) -> bool {
    clear_error(out_error);

    // Safety: config is null or points to a valid config.
    let config = unsafe { config.as_ref() };
    let filter = match resolve_filter(config) {
        Ok(filter) => filter,
        Err(message) => {
            report(out_error, BasicModuleError::Logging(message));
            return false;
        }
    };

    if !install_logger() {
        report(
            out_error,
            BasicModuleError::Logging("logging already initialized by another logger".into()),
        );
        return false;
    }

    let sink = config
        .and_then(|config| {
            Some(Sink::Callback {
                callback: config.callback?,
                user_data: config.user_data as usize,
            })
        })
        .unwrap_or(Sink::Stderr);

    let max_level = filter.max_level();
    LOGGER.configure(LoggerState { filter, sink });
    log::set_max_level(max_level);
    log::debug!(target: DEFAULT_TARGET, "logging configured with max level {max_level}");
    true
}
