//! Logging for the fieldcheck validation engine.
//!
//! Messages go to stderr in one of three formats and are filtered by a
//! process-wide level. Everything is driven by environment variables so the
//! engine can be embedded in a host application without extra wiring.
//!
//! # Usage
//!
//! ```rust
//! use fieldcheck_log::{debug, info, trace, warn};
//!
//! debug!("validating {} fields", 3);
//! info!(target: "fieldcheck::ingest", "decoded form body");
//! warn!("uniqueness lookup failed");
//! trace!("ignoring unknown rule {:?}", "uuid");
//! ```
//!
//! Key-value context can be attached with [`log_fields`]:
//!
//! ```rust
//! use fieldcheck_log::{Level, log_fields};
//!
//! log_fields(
//!     Level::Debug,
//!     "fieldcheck::engine",
//!     "rule failed",
//!     &[("field", "email"), ("rule", "email")],
//! );
//! ```
//!
//! # Environment Variables
//!
//! - `FIELDCHECK_DEBUG=1` - enable debug logging
//! - `FIELDCHECK_LOG_LEVEL=trace|debug|info|warn|error|off`
//! - `FIELDCHECK_LOG_FORMAT=pretty|compact|json` (default `json`)
//! - `FIELDCHECK_LOG_COLOR=1|0`
//! - `FIELDCHECK_LOG_TIMESTAMPS=1|0`
//! - `FIELDCHECK_LOG_MODULE=1|0`

use once_cell::sync::Lazy;
use std::env;
use std::io::{IsTerminal, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Prefix shared by every logging environment variable.
pub const ENV_PREFIX: &str = "FIELDCHECK";

// ============================================================================
// Levels and formats
// ============================================================================

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Disables output entirely.
    Off = 5,
}

impl Level {
    /// Upper-case name used in every output format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }

    #[cfg(feature = "color")]
    fn colored(&self) -> colored::ColoredString {
        use colored::Colorize;
        match self {
            Level::Trace => "TRACE".magenta(),
            Level::Debug => "DEBUG".blue(),
            Level::Info => "INFO".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERROR".red().bold(),
            Level::Off => "OFF".white(),
        }
    }
}

impl FromStr for Level {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            _ => Err(UnknownName(s.to_string())),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable, one line per message with optional colors.
    Pretty,
    /// Short single-letter level, time of day only.
    Compact,
    /// One JSON object per line.
    Json,
}

impl FromStr for Format {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            _ => Err(UnknownName(s.to_string())),
        }
    }
}

/// Returned when a level or format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName(pub String);

impl std::fmt::Display for UnknownName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown name: {}", self.0)
    }
}

impl std::error::Error for UnknownName {}

// ============================================================================
// Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);
static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
    LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);
    config
});

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub timestamps: bool,
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            timestamps: true,
            module_path: true,
        }
    }
}

impl LogConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Keys are the full variable names, e.g. `FIELDCHECK_LOG_LEVEL`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{}_{}", ENV_PREFIX, suffix));
        let flag = |suffix: &str, default: bool| {
            var(suffix)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        let debug = flag("DEBUG", false);
        let level = var("LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { Level::Info });
        let format = var("LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Format::Json);
        let color_default = lookup("NO_COLOR").is_none() && std::io::stderr().is_terminal();

        Self {
            debug,
            level,
            format,
            color: flag("LOG_COLOR", color_default),
            timestamps: flag("LOG_TIMESTAMPS", true),
            module_path: flag("LOG_MODULE", true),
        }
    }
}

/// Force the environment to be read now instead of on first use.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// The active configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

#[inline]
pub fn is_debug_enabled() -> bool {
    Lazy::force(&CONFIG);
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    Lazy::force(&CONFIG);
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

pub fn current_level() -> Level {
    Lazy::force(&CONFIG);
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Change the minimum level at runtime.
pub fn set_level(level: Level) {
    Lazy::force(&CONFIG);
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Toggle debug mode at runtime. Enabling it lowers the level to debug.
pub fn set_debug(enabled: bool) {
    Lazy::force(&CONFIG);
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

// ============================================================================
// Output
// ============================================================================

/// Write a message. Used by the macros.
#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    log_fields(level, target, message, &[]);
}

/// Write a message with key-value context.
pub fn log_fields(level: Level, target: &str, message: &str, fields: &[(&str, &str)]) {
    let forced = level == Level::Debug && is_debug_enabled();
    if !forced && !is_level_enabled(level) {
        return;
    }

    let config = config();
    let line = match config.format {
        Format::Pretty => render_pretty(level, target, message, fields, config),
        Format::Compact => render_compact(level, target, message, fields, config),
        Format::Json => render_json(level, target, message, fields),
    };

    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", line);
}

fn render_pretty(
    level: Level,
    target: &str,
    message: &str,
    fields: &[(&str, &str)],
    config: &LogConfig,
) -> String {
    let mut out = String::new();

    if config.timestamps {
        out.push_str(&chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f ").to_string());
    }

    #[cfg(feature = "color")]
    let level_name = if config.color {
        format!("{:5}", level.colored())
    } else {
        format!("{:5}", level.as_str())
    };
    #[cfg(not(feature = "color"))]
    let level_name = format!("{:5}", level.as_str());
    out.push_str(&level_name);
    out.push(' ');

    if config.module_path && !target.is_empty() {
        out.push_str(&format!("[{}] ", target));
    }

    out.push_str(message);
    for (key, value) in fields {
        out.push_str(&format!(" {}={:?}", key, value));
    }
    out
}

fn render_compact(
    level: Level,
    target: &str,
    message: &str,
    fields: &[(&str, &str)],
    config: &LogConfig,
) -> String {
    let mut out = String::new();

    if config.timestamps {
        out.push_str(&chrono::Local::now().format("%H:%M:%S ").to_string());
    }
    out.push(level.as_str().chars().next().unwrap_or('?'));
    out.push(' ');
    if config.module_path && !target.is_empty() {
        out.push_str(target);
        out.push_str(": ");
    }
    out.push_str(message);
    for (key, value) in fields {
        out.push_str(&format!(" {}={}", key, value));
    }
    out
}

#[cfg(feature = "json")]
fn render_json(level: Level, target: &str, message: &str, fields: &[(&str, &str)]) -> String {
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Entry<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        fields: BTreeMap<&'a str, &'a str>,
    }

    let entry = Entry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
        fields: fields.iter().copied().collect(),
    };

    serde_json::to_string(&entry).unwrap_or_else(|_| message.to_string())
}

#[cfg(not(feature = "json"))]
fn render_json(level: Level, target: &str, message: &str, fields: &[(&str, &str)]) -> String {
    let mut out = format!(
        r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}""#,
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        escape_json(target),
        escape_json(message)
    );
    if !fields.is_empty() {
        let body: Vec<String> = fields
            .iter()
            .map(|(k, v)| format!(r#""{}":"{}""#, escape_json(k), escape_json(v)))
            .collect();
        out.push_str(&format!(r#","fields":{{{}}}"#, body.join(",")));
    }
    out.push('}');
    out
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

// ============================================================================
// Macros
// ============================================================================

/// Log at trace level.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::trace!(target: module_path!(), $($arg)+)
    };
}

/// Log at debug level. Also emitted when `FIELDCHECK_DEBUG=1`.
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::debug!(target: module_path!(), $($arg)+)
    };
}

/// Log at info level.
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::info!(target: module_path!(), $($arg)+)
    };
}

/// Log at warn level.
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::warn!(target: module_path!(), $($arg)+)
    };
}

/// Log at error level.
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::error!(target: module_path!(), $($arg)+)
    };
}

// ============================================================================
// Tracing bridge
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! A `tracing` subscriber that honours the fieldcheck level settings.

    use super::*;

    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let config = config();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_ascii_lowercase()));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(config.color))
    }
}
