use super::collector::{BuildpackDetector, ExecutionContext};
use super::error::DetectionExecutionError;
use super::model::{BuildpackRef, DetectionOutcome};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted detector keyed by buildpack ID. Unscripted buildpacks fail.
pub struct MockDetector {
    responses: HashMap<String, MockDetection>,
    calls: Mutex<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct MockDetection {
    pub outcome: DetectionOutcome,
    pub error: Option<String>,
    pub delay: Option<Duration>,
}

impl MockDetection {
    pub fn outcome(outcome: DetectionOutcome) -> Self {
        Self {
            outcome,
            error: None,
            delay: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            outcome: DetectionOutcome::fail(),
            error: Some(message.into()),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl MockDetector {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, id: impl Into<String>, response: MockDetection) -> Self {
        self.responses.insert(id.into(), response);
        self
    }

    pub fn with_outcome(self, id: impl Into<String>, outcome: DetectionOutcome) -> Self {
        self.with_response(id, MockDetection::outcome(outcome))
    }

    pub fn passing(self, id: impl Into<String>) -> Self {
        self.with_outcome(id, DetectionOutcome::pass())
    }

    pub fn failing(self, id: impl Into<String>) -> Self {
        self.with_outcome(id, DetectionOutcome::fail())
    }

    pub fn with_error(self, id: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_response(id, MockDetection::error(message))
    }

    /// IDs of every buildpack detected so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, id: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == id)
    }
}

impl Default for MockDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildpackDetector for MockDetector {
    async fn detect(
        &self,
        buildpack: &BuildpackRef,
        _context: &ExecutionContext,
    ) -> Result<DetectionOutcome, DetectionExecutionError> {
        self.calls.lock().unwrap().push(buildpack.id.clone());

        let Some(response) = self.responses.get(&buildpack.id).cloned() else {
            return Ok(DetectionOutcome::fail());
        };

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }

        match response.error {
            Some(message) => Err(DetectionExecutionError::Other(message)),
            None => Ok(response.outcome),
        }
    }
}

impl std::fmt::Debug for MockDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDetector")
            .field("scripted", &self.responses.len())
            .field("calls", &self.calls())
            .finish()
    }
}
