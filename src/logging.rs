//! Structured logging setup.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application. [`init_logging`] is the stock way to do it: an
//! `EnvFilter` (honouring `RUST_LOG` when set) in front of a JSON or pretty
//! `fmt` layer.
//!
//! ```rust
//! use apidispatch::logging::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig {
//!     level: "debug".to_string(),
//!     format: LogFormat::Pretty,
//!     ..LogConfig::default()
//! };
//! let installed = init_logging(&config).unwrap();
//! // a second install is refused, not an error
//! assert!(installed);
//! assert!(!init_logging(&config).unwrap());
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    /// Parse a format name; anything other than `pretty` is JSON.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive: `trace`/`debug`/`info`/`warn`/`error`, or a full
    /// `EnvFilter` expression such as `apidispatch=debug,info`
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include file:line location (dev only)
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Defaults overridden by `APIDISPATCH_LOG_LEVEL` and
    /// `APIDISPATCH_LOG_FORMAT`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `APIDISPATCH_LOG_*` variables that are set.
    pub fn apply_env(&mut self) {
        if let Ok(level) = env::var("APIDISPATCH_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(format) = env::var("APIDISPATCH_LOG_FORMAT") {
            self.format = LogFormat::parse(&format);
        }
    }

    /// Development preset: debug level, pretty output with locations.
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
        }
    }
}

/// Install a global subscriber for `config`.
///
/// Returns `Ok(false)` when a global subscriber is already installed.
///
/// # Errors
///
/// Fails when `config.level` is not a valid filter directive.
pub fn init_logging(config: &LogConfig) -> Result<bool> {
    let env_filter = match env::var("RUST_LOG") {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(&directive)
            .with_context(|| format!("Invalid RUST_LOG directive '{directive}'"))?,
        _ => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level '{}'", config.level))?,
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();
    Ok(installed)
}
