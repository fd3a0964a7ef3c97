//! Structured logging setup for the detector
//!
//! Built on the `tracing` ecosystem. The detection core only emits events;
//! this module decides where they go.
//!
//! # Example
//!
//! ```no_run
//! use buildpack_detector::util::logging;
//!
//! logging::init_logging(logging::config_from_env(None, false));
//!
//! use tracing::{debug, info};
//! info!("Starting detection");
//! debug!(buildpack = "acme/node@1.0", "pass");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., buildpack_detector::detect) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata, for platforms that collect logs
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }
}

/// Parses a log level from a string, falling back to `INFO`.
///
/// ```
/// use buildpack_detector::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Default filter directives: the library and the `detector` binary, both at `level`.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("buildpack_detector={level},detector={level}")
}

/// Installs the global subscriber. Only the first call has an effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(default_directives(config.level))
        };

        // Logs go to stderr; stdout is reserved for the rendered result
        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

/// Builds a config from `CNB_LOG_LEVEL` and `CNB_LOG_JSON`. An explicit
/// `level` wins over the environment, and `json` forces JSON output.
pub fn config_from_env(level: Option<&str>, json: bool) -> LoggingConfig {
    let level = match level {
        Some(level) => parse_level(level),
        None => env::var("CNB_LOG_LEVEL")
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO),
    };
    let use_json = json
        || env::var("CNB_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

    if use_json {
        LoggingConfig {
            level,
            ..LoggingConfig::production()
        }
    } else {
        LoggingConfig::with_level(level)
    }
}
