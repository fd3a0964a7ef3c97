//! Configuration management for the detector
//!
//! Settings are loaded from `CNB_*` environment variables with sensible
//! defaults, then overridden by command-line flags.
//!
//! # Environment Variables
//!
//! - `CNB_ORDER_PATH`: order file - default: "/cnb/order.toml"
//! - `CNB_BUILDPACKS_DIR`: buildpack descriptors - default: "/cnb/buildpacks"
//! - `CNB_APP_DIR`: application source - default: "/workspace"
//! - `CNB_PLATFORM_DIR`: platform configuration - default: "/platform"
//! - `CNB_LAYERS_DIR`: output directory - default: "/layers"
//! - `CNB_GROUP_PATH`: group output, relative to the layers dir - default: "group.toml"
//! - `CNB_PLAN_PATH`: plan output, relative to the layers dir - default: "plan.toml"
//! - `CNB_LOG_LEVEL`: logging level - default: "info"
//! - `CNB_DETECT_TIMEOUT`: seconds allowed per `bin/detect` run - default: "300"
//! - `CNB_ALLOW_ROOT`: run even when the effective user is root - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use buildpack_detector::DetectorConfig;
//!
//! let config = DetectorConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::detect::ExecutionContext;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_ORDER_PATH: &str = "/cnb/order.toml";
const DEFAULT_BUILDPACKS_DIR: &str = "/cnb/buildpacks";
const DEFAULT_APP_DIR: &str = "/workspace";
const DEFAULT_PLATFORM_DIR: &str = "/platform";
const DEFAULT_LAYERS_DIR: &str = "/layers";
const DEFAULT_GROUP_FILE: &str = "group.toml";
const DEFAULT_PLAN_FILE: &str = "plan.toml";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_DETECT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub order_path: PathBuf,
    pub buildpacks_dir: PathBuf,
    pub app_dir: PathBuf,
    pub platform_dir: PathBuf,
    pub layers_dir: PathBuf,

    /// Relative paths resolve against `layers_dir`
    pub group_path: PathBuf,
    pub plan_path: PathBuf,

    pub log_level: String,
    pub detect_timeout_secs: u64,

    /// Detection refuses to start as root unless set
    pub allow_root: bool,
}

impl Default for DetectorConfig {
    /// Loads from `CNB_*` environment variables, falling back to defaults
    fn default() -> Self {
        let path_var = |key: &str, default: &str| {
            env::var(key)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        let detect_timeout_secs = env::var("CNB_DETECT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_DETECT_TIMEOUT_SECS);

        let log_level = env::var("CNB_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let allow_root = env::var("CNB_ALLOW_ROOT")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false);

        Self {
            order_path: path_var("CNB_ORDER_PATH", DEFAULT_ORDER_PATH),
            buildpacks_dir: path_var("CNB_BUILDPACKS_DIR", DEFAULT_BUILDPACKS_DIR),
            app_dir: path_var("CNB_APP_DIR", DEFAULT_APP_DIR),
            platform_dir: path_var("CNB_PLATFORM_DIR", DEFAULT_PLATFORM_DIR),
            layers_dir: path_var("CNB_LAYERS_DIR", DEFAULT_LAYERS_DIR),
            group_path: path_var("CNB_GROUP_PATH", DEFAULT_GROUP_FILE),
            plan_path: path_var("CNB_PLAN_PATH", DEFAULT_PLAN_FILE),
            log_level,
            detect_timeout_secs,
            allow_root,
        }
    }
}

impl DetectorConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the timeout or log level is out of range, or
    /// if a required path is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detect_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Detect timeout must be at least 1 second".to_string(),
            ));
        }

        for (field, path) in [
            ("order path", &self.order_path),
            ("buildpacks dir", &self.buildpacks_dir),
            ("app dir", &self.app_dir),
            ("layers dir", &self.layers_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationFailed(format!("{} must not be empty", field)));
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn resolved_group_path(&self) -> PathBuf {
        resolve_in(&self.layers_dir, &self.group_path)
    }

    pub fn resolved_plan_path(&self) -> PathBuf {
        resolve_in(&self.layers_dir, &self.plan_path)
    }

    pub fn detect_timeout(&self) -> Duration {
        Duration::from_secs(self.detect_timeout_secs)
    }

    pub fn execution_context(&self) -> ExecutionContext {
        ExecutionContext::new(&self.app_dir, &self.platform_dir, &self.buildpacks_dir)
    }
}

fn resolve_in(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

impl fmt::Display for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detector Configuration:")?;
        writeln!(f, "  order_path: {}", self.order_path.display())?;
        writeln!(f, "  buildpacks_dir: {}", self.buildpacks_dir.display())?;
        writeln!(f, "  app_dir: {}", self.app_dir.display())?;
        writeln!(f, "  platform_path: {}", self.platform_dir.display())?;
        writeln!(f, "  group_path: {}", self.resolved_group_path().display())?;
        writeln!(f, "  plan_path: {}", self.resolved_plan_path().display())?;
        writeln!(f, "  detect_timeout: {}s", self.detect_timeout_secs)?;
        writeln!(f, "  log_level: {}", self.log_level)?;
        writeln!(f, "  allow_root: {}", self.allow_root)?;
        Ok(())
    }
}
