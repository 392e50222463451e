//! Flagstone Logging
//!
//! Installs a `tracing` subscriber configured from `FLAGSTONE_*`
//! environment variables. The evaluation crates only emit `tracing` events;
//! this crate decides where they go.
//!
//! # Usage
//!
//! ```rust
//! // Once, early in main
//! flagstone_log::try_init().ok();
//!
//! tracing::info!(configs = 12, "Configuration loaded");
//! ```
//!
//! # Environment Variables
//!
//! - `FLAGSTONE_DEBUG=1` - Enable debug logging
//! - `FLAGSTONE_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `FLAGSTONE_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `FLAGSTONE_LOG_COLOR=1|0` - Enable/disable colors
//! - `FLAGSTONE_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `FLAGSTONE_LOG_MODULE=1|0` - Include the event target
//!
//! `RUST_LOG`, when set, replaces the level filter entirely.

use std::env;
use std::str::FromStr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

// ============================================================================
// Log Levels
// ============================================================================

/// Log level for Flagstone logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warning level
    Warn,
    /// Error level (least verbose)
    Error,
    /// Off (no logging)
    Off,
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

    /// Directive understood by `EnvFilter`
    pub fn directive(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            other => Err(format!("unknown log level '{}'", other)),
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
    /// Multi-line human readable output
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled
    pub color: bool,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include the event target
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false, // JSON output doesn't use colors
            timestamps: true,
            module_path: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| lookup(name).map(|v| v == "1" || v.to_lowercase() == "true");

        let debug = flag("FLAGSTONE_DEBUG").unwrap_or(false);

        let level = lookup("FLAGSTONE_LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = lookup("FLAGSTONE_LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Format::Json);

        let color = flag("FLAGSTONE_LOG_COLOR")
            .unwrap_or_else(|| lookup("NO_COLOR").is_none() && lookup("TERM").is_some());

        Self {
            debug,
            level,
            format,
            color,
            timestamps: flag("FLAGSTONE_LOG_TIMESTAMPS").unwrap_or(true),
            module_path: flag("FLAGSTONE_LOG_MODULE").unwrap_or(true),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Level actually applied; debug mode lowers it to at least `Debug`
    pub fn effective_level(&self) -> Level {
        if self.debug && self.level > Level::Debug {
            Level::Debug
        } else {
            self.level
        }
    }

    /// Level filter: `RUST_LOG` when valid, else the configured level
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.effective_level().directive()))
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(self.module_path)
            .with_ansi(self.color && self.format != Format::Json);

        match (self.format, self.timestamps) {
            (Format::Json, true) => base.json().boxed(),
            (Format::Json, false) => base.json().without_time().boxed(),
            (Format::Compact, true) => base.compact().boxed(),
            (Format::Compact, false) => base.compact().without_time().boxed(),
            (Format::Pretty, true) => base.pretty().boxed(),
            (Format::Pretty, false) => base.pretty().without_time().boxed(),
        }
    }

    /// Subscriber for this configuration
    pub fn subscriber(self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::registry()
            .with(self.fmt_layer())
            .with(self.filter())
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Subscriber configured from the environment.
pub fn subscriber() -> impl tracing::Subscriber + Send + Sync {
    LogConfig::from_env().subscriber()
}

/// Install the environment-configured subscriber as the global default.
///
/// Fails when a global subscriber is already set.
pub fn try_init() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(subscriber())
}

/// Like [`try_init`], ignoring an already installed subscriber.
pub fn init() {
    let _ = try_init();
}

// ============================================================================
// Tests
// ============================================================================
