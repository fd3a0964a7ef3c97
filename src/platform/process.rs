//! Runs buildpack `bin/detect` executables
//!
//! The executable is invoked as `bin/detect <platform dir> <plan path>` from
//! the app directory. Exit code 0 means the buildpack applies and 100 means it
//! does not; any other status is an execution error. Each run writes its plan
//! into its own scratch directory.

use super::catalog::buildpack_dir;
use crate::detect::{
    BuildpackDetector, BuildpackRef, DetectionExecutionError, DetectionOutcome, ExecutionContext,
    Provision, Requirement,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub const CODE_DETECT_PASS: i32 = 0;
pub const CODE_DETECT_FAIL: i32 = 100;

#[derive(Debug, Default, Deserialize)]
struct DetectPlan {
    #[serde(default)]
    provides: Vec<Provision>,
    #[serde(default)]
    requires: Vec<PlanRequirement>,
}

#[derive(Debug, Deserialize)]
struct PlanRequirement {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    metadata: toml::Table,
}

/// Parses the plan a buildpack wrote during detection. A top-level `version`
/// on a requirement is moved into its metadata.
pub fn parse_detect_plan(contents: &str) -> Result<DetectionOutcome, toml::de::Error> {
    let plan: DetectPlan = toml::from_str(contents)?;

    let requires = plan
        .requires
        .into_iter()
        .map(|req| {
            let mut metadata = req.metadata;
            if let Some(version) = req.version {
                metadata
                    .entry("version".to_string())
                    .or_insert(toml::Value::String(version));
            }
            Requirement {
                name: req.name,
                metadata,
            }
        })
        .collect();

    Ok(DetectionOutcome {
        passed: true,
        requires,
        provides: plan.provides,
    })
}

#[derive(Debug, Clone)]
pub struct ProcessDetector {
    timeout: Duration,
}

impl ProcessDetector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl BuildpackDetector for ProcessDetector {
    async fn detect(
        &self,
        buildpack: &BuildpackRef,
        context: &ExecutionContext,
    ) -> Result<DetectionOutcome, DetectionExecutionError> {
        let name = buildpack.to_string();
        let dir = buildpack_dir(&context.buildpacks_dir, buildpack);

        let scratch = tempfile::Builder::new()
            .prefix("detect-")
            .tempdir()
            .map_err(|source| DetectionExecutionError::Spawn {
                buildpack: name.clone(),
                source,
            })?;
        let plan_path = scratch.path().join("plan.toml");
        tokio::fs::write(&plan_path, "")
            .await
            .map_err(|source| DetectionExecutionError::Spawn {
                buildpack: name.clone(),
                source,
            })?;

        let mut command = Command::new(dir.join("bin").join("detect"));
        command
            .arg(&context.platform_dir)
            .arg(&plan_path)
            .current_dir(&context.app_dir)
            .env("CNB_BUILDPACK_DIR", &dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(buildpack = %name, dir = %dir.display(), "Running detect");
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| DetectionExecutionError::Timeout {
                buildpack: name.clone(),
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|source| DetectionExecutionError::Spawn {
                buildpack: name.clone(),
                source,
            })?;

        if !output.stdout.is_empty() || !output.stderr.is_empty() {
            debug!(
                buildpack = %name,
                stdout = %String::from_utf8_lossy(&output.stdout).trim_end(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "detect output"
            );
        }

        match output.status.code() {
            Some(CODE_DETECT_PASS) => {
                let contents = tokio::fs::read_to_string(&plan_path).await.map_err(|e| {
                    DetectionExecutionError::InvalidPlan {
                        buildpack: name.clone(),
                        message: e.to_string(),
                    }
                })?;
                parse_detect_plan(&contents).map_err(|e| DetectionExecutionError::InvalidPlan {
                    buildpack: name,
                    message: e.to_string(),
                })
            }
            Some(CODE_DETECT_FAIL) => Ok(DetectionOutcome::fail()),
            _ => Err(DetectionExecutionError::UnexpectedExit {
                buildpack: name,
                status: output.status.to_string(),
            }),
        }
    }
}
