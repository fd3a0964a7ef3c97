//! Utility modules for the detector

pub mod logging;

pub use logging::{config_from_env, default_directives, init_logging, parse_level, LoggingConfig};
