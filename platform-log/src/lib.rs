//! Platform Logging
//!
//! Structured logging for the platform services. Unlike a process-wide
//! logger, every component receives its own [`Logger`] at construction time,
//! so nothing is configured as a side effect of loading a module.
//!
//! # Usage
//!
//! ```rust
//! use platform_log::{debug, info, LogConfig, Logger};
//!
//! let logger = Logger::new(LogConfig::default());
//! info!(logger, "Resolver ready");
//!
//! let resolver_log = logger.with_target("platform::resolver");
//! debug!(resolver_log, "Looking up business {}", "biz_abc");
//! ```
//!
//! # Environment Variables
//!
//! [`LogConfig::from_env_prefix`] reads, for a prefix such as `PLATFORM`:
//!
//! - `PLATFORM_DEBUG=1` - Enable debug logging
//! - `PLATFORM_LOG_LEVEL=debug|info|warn|error` - Set log level
//! - `PLATFORM_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `PLATFORM_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `PLATFORM_LOG_MODULE=1|0` - Include the log target

use parking_lot::Mutex;
use std::fmt::Write as _;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// Log Levels
// ============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level (least verbose)
    Error = 4,
    /// Off (no logging)
    Off = 5,
}

impl Level {
    /// Get level name.
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

    fn to_log_level(self) -> Option<log::Level> {
        match self {
            Level::Trace => Some(log::Level::Trace),
            Level::Debug => Some(log::Level::Debug),
            Level::Info => Some(log::Level::Info),
            Level::Warn => Some(log::Level::Warn),
            Level::Error => Some(log::Level::Error),
            Level::Off => None,
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human readable multi-field format
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include the target
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            timestamps: true,
            module_path: true,
        }
    }
}

impl LogConfig {
    /// Create config from `<PREFIX>_*` environment variables.
    pub fn from_env_prefix(prefix: &str) -> Self {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    ///
    /// Unknown or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", prefix, name));
        let flag = |name: &str, default: bool| {
            var(name)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        let debug = flag("DEBUG", false);

        let mut level = var("LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { Level::Info });
        if debug && level > Level::Debug {
            level = Level::Debug;
        }

        let format = var("LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Format::Json);

        Self {
            debug,
            level,
            format,
            timestamps: flag("LOG_TIMESTAMPS", true),
            module_path: flag("LOG_MODULE", true),
        }
    }

    /// Set the minimum level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable timestamps.
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }
}

// ============================================================================
// Sinks
// ============================================================================

enum Sink {
    Stderr,
    Memory(Arc<Mutex<Vec<String>>>),
    Facade,
    Discard,
}

/// Lines captured by a logger created with [`Logger::capture`].
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    /// All captured lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Whether any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }

    /// Number of captured lines.
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

// ============================================================================
// Logger
// ============================================================================

struct LoggerInner {
    config: LogConfig,
    sink: Sink,
}

/// A logger instance handed to each component.
///
/// Cloning is cheap; clones share configuration and sink.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
    target: Option<Arc<str>>,
}

impl Logger {
    /// Logger writing to stderr.
    pub fn new(config: LogConfig) -> Self {
        Self::with_sink(config, Sink::Stderr)
    }

    /// Logger forwarding every record to the `log` facade.
    pub fn facade(config: LogConfig) -> Self {
        Self::with_sink(config, Sink::Facade)
    }

    /// Logger that discards everything.
    pub fn disabled() -> Self {
        Self::with_sink(LogConfig::default().with_level(Level::Off), Sink::Discard)
    }

    /// Logger that keeps rendered lines in memory.
    pub fn capture(config: LogConfig) -> (Self, LogCapture) {
        let capture = LogCapture::default();
        let logger = Self::with_sink(config, Sink::Memory(Arc::clone(&capture.lines)));
        (logger, capture)
    }

    fn with_sink(config: LogConfig, sink: Sink) -> Self {
        Self {
            inner: Arc::new(LoggerInner { config, sink }),
            target: None,
        }
    }

    /// Derive a logger that reports under a fixed target.
    pub fn with_target(&self, target: impl Into<String>) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            target: Some(Arc::from(target.into())),
        }
    }

    /// The configuration this logger was built with.
    pub fn config(&self) -> &LogConfig {
        &self.inner.config
    }

    /// Check if a log level is enabled.
    #[inline]
    pub fn is_enabled(&self, level: Level) -> bool {
        if level == Level::Off {
            return false;
        }
        let config = &self.inner.config;
        level >= config.level || (config.debug && level == Level::Debug)
    }

    /// Log a message with the given level.
    ///
    /// `default_target` is used unless the logger has a fixed target.
    #[doc(hidden)]
    pub fn log(&self, level: Level, default_target: &str, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        let target = self.target.as_deref().unwrap_or(default_target);

        match &self.inner.sink {
            Sink::Discard => {}
            Sink::Facade => {
                if let Some(lvl) = level.to_log_level() {
                    log::log!(target: target, lvl, "{}", message);
                }
            }
            Sink::Stderr => {
                let line = self.render(level, target, message);
                let _ = writeln!(std::io::stderr().lock(), "{}", line);
            }
            Sink::Memory(lines) => {
                let line = self.render(level, target, message);
                lines.lock().push(line);
            }
        }
    }

    fn render(&self, level: Level, target: &str, message: &str) -> String {
        let config = &self.inner.config;
        match config.format {
            Format::Pretty => render_pretty(level, target, message, config),
            Format::Compact => render_compact(level, target, message, config),
            Format::Json => render_json(level, target, message),
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.inner.config)
            .field("target", &self.target)
            .finish()
    }
}

fn render_pretty(level: Level, target: &str, message: &str, config: &LogConfig) -> String {
    let mut line = String::new();

    if config.timestamps {
        let now = chrono::Local::now();
        let _ = write!(line, "{} ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    let _ = write!(line, "{:5} ", level.as_str());

    if config.module_path && !target.is_empty() {
        let _ = write!(line, "[{}] ", target);
    }

    line.push_str(message);
    line
}

fn render_compact(level: Level, target: &str, message: &str, config: &LogConfig) -> String {
    let mut line = String::new();

    if config.timestamps {
        let now = chrono::Local::now();
        let _ = write!(line, "{} ", now.format("%H:%M:%S"));
    }

    let _ = write!(line, "{} ", level.as_str().chars().next().unwrap_or('?'));

    if config.module_path && !target.is_empty() {
        let _ = write!(line, "{}: ", target);
    }

    line.push_str(message);
    line
}

#[cfg(feature = "json")]
fn render_json(level: Level, target: &str, message: &str) -> String {
    use serde::Serialize;

    #[derive(Serialize)]
    struct LogEntry<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let entry = LogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
    };

    serde_json::to_string(&entry).unwrap_or_else(|_| message.to_string())
}

#[cfg(not(feature = "json"))]
fn render_json(level: Level, target: &str, message: &str) -> String {
    format!(
        r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}"}}"#,
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        escape_json(target),
        escape_json(message)
    )
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result
}

// ============================================================================
// Macros
// ============================================================================

/// Log a trace message through the given logger.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        if logger.is_enabled($crate::Level::Trace) {
            logger.log($crate::Level::Trace, module_path!(), &format!($($arg)+));
        }
    }};
}

/// Log a debug message through the given logger.
///
/// # Example
///
/// ```rust
/// use platform_log::{debug, Logger};
///
/// let logger = Logger::disabled();
/// let business_id = "biz_abc";
/// debug!(logger, "Resolving tenant database for {}", business_id);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        if logger.is_enabled($crate::Level::Debug) {
            logger.log($crate::Level::Debug, module_path!(), &format!($($arg)+));
        }
    }};
}

/// Log an info message through the given logger.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        if logger.is_enabled($crate::Level::Info) {
            logger.log($crate::Level::Info, module_path!(), &format!($($arg)+));
        }
    }};
}

/// Log a warning message through the given logger.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        if logger.is_enabled($crate::Level::Warn) {
            logger.log($crate::Level::Warn, module_path!(), &format!($($arg)+));
        }
    }};
}

/// Log an error message through the given logger.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        if logger.is_enabled($crate::Level::Error) {
            logger.log($crate::Level::Error, module_path!(), &format!($($arg)+));
        }
    }};
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("debug".parse::<Level>(), Ok(Level::Debug));
        assert_eq!("DEBUG".parse::<Level>(), Ok(Level::Debug));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("none".parse::<Level>(), Ok(Level::Off));
        assert!("invalid".parse::<Level>().is_err());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("pretty".parse::<Format>(), Ok(Format::Pretty));
        assert_eq!("Compact".parse::<Format>(), Ok(Format::Compact));
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert!("xml".parse::<Format>().is_err());
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("APP_LOG_LEVEL", "warn"),
            ("APP_LOG_FORMAT", "compact"),
            ("APP_LOG_TIMESTAMPS", "0"),
        ]);
        let config = LogConfig::from_lookup("APP", |k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.format, Format::Compact);
        assert!(!config.timestamps);
        assert!(config.module_path);
    }

    #[test]
    fn test_debug_flag_lowers_level() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("APP_DEBUG", "true"), ("APP_LOG_LEVEL", "error")]);
        let config = LogConfig::from_lookup("APP", |k| vars.get(k).map(|v| v.to_string()));

        assert!(config.debug);
        assert_eq!(config.level, Level::Debug);
    }

    #[test]
    fn test_level_filtering() {
        let (logger, capture) = Logger::capture(LogConfig::default().with_level(Level::Warn));

        info!(logger, "dropped");
        warn!(logger, "kept {}", 1);
        error!(logger, "kept {}", 2);

        assert_eq!(capture.len(), 2);
        assert!(!capture.contains("dropped"));
    }

    #[test]
    fn test_json_line_fields() {
        let (logger, capture) = Logger::capture(LogConfig::default());
        let scoped = logger.with_target("platform::test");

        info!(scoped, "hello \"world\"");

        let line = &capture.lines()[0];
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["target"], "platform::test");
        assert_eq!(value["message"], "hello \"world\"");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_compact_without_timestamps() {
        let config = LogConfig::default()
            .with_format(Format::Compact)
            .with_timestamps(false);
        let (logger, capture) = Logger::capture(config);

        warn!(logger.with_target("db"), "slow open");

        assert_eq!(capture.lines(), vec!["W db: slow open".to_string()]);
    }

    #[test]
    fn test_clones_share_sink() {
        let (logger, capture) = Logger::capture(LogConfig::default());
        let clone = logger.clone();

        info!(logger, "one");
        info!(clone, "two");

        assert_eq!(capture.len(), 2);
    }

    #[test]
    fn test_disabled_logger() {
        let logger = Logger::disabled();
        assert!(!logger.is_enabled(Level::Error));
        error!(logger, "never rendered");
    }
}
