//! Detection outcome collection
//!
//! The resolver never runs buildpacks itself. A [`BuildpackDetector`] does,
//! and [`OutcomeCollector`] turns whatever it returns into a plain
//! [`DetectionOutcome`] plus an optional execution error for diagnostics.

use super::error::DetectionExecutionError;
use super::model::{BuildpackRef, DetectionOutcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Directories handed through to the executor untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub app_dir: PathBuf,
    pub platform_dir: PathBuf,
    pub buildpacks_dir: PathBuf,
}

impl ExecutionContext {
    pub fn new(
        app_dir: impl Into<PathBuf>,
        platform_dir: impl Into<PathBuf>,
        buildpacks_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            app_dir: app_dir.into(),
            platform_dir: platform_dir.into(),
            buildpacks_dir: buildpacks_dir.into(),
        }
    }
}

/// Runs the detection of a single leaf buildpack.
#[async_trait]
pub trait BuildpackDetector: Send + Sync {
    async fn detect(
        &self,
        buildpack: &BuildpackRef,
        context: &ExecutionContext,
    ) -> Result<DetectionOutcome, DetectionExecutionError>;
}

#[async_trait]
impl<T: BuildpackDetector + ?Sized> BuildpackDetector for Arc<T> {
    async fn detect(
        &self,
        buildpack: &BuildpackRef,
        context: &ExecutionContext,
    ) -> Result<DetectionOutcome, DetectionExecutionError> {
        (**self).detect(buildpack, context).await
    }
}

/// A detection outcome together with the executor error that caused it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedOutcome {
    pub outcome: DetectionOutcome,
    pub error: Option<String>,
}

impl CollectedOutcome {
    pub fn passed(&self) -> bool {
        self.outcome.passed
    }
}

/// Runs a detector against a fixed [`ExecutionContext`] and normalizes what
/// it returns. A failed outcome loses its declarations; an execution error
/// becomes a failed outcome carrying the error message.
pub struct OutcomeCollector<D> {
    detector: D,
    context: ExecutionContext,
}

impl<D: BuildpackDetector> OutcomeCollector<D> {
    pub fn new(detector: D, context: ExecutionContext) -> Self {
        Self { detector, context }
    }

    pub async fn collect(&self, buildpack: &BuildpackRef) -> CollectedOutcome {
        match self.detector.detect(buildpack, &self.context).await {
            Ok(outcome) if outcome.passed => {
                debug!(
                    buildpack = %buildpack,
                    requires = outcome.requires.len(),
                    provides = outcome.provides.len(),
                    "pass"
                );
                CollectedOutcome {
                    outcome,
                    error: None,
                }
            }
            Ok(_) => {
                debug!(buildpack = %buildpack, "skip");
                CollectedOutcome {
                    outcome: DetectionOutcome::fail(),
                    error: None,
                }
            }
            Err(e) => {
                warn!(buildpack = %buildpack, error = %e, "err");
                CollectedOutcome {
                    outcome: DetectionOutcome::fail(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
