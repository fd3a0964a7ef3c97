//! Resolution results and the diagnostics trace behind them
//!
//! A [`ResolutionResult`] is either a winning group with its build plan or
//! exhaustion. Both carry the trace of every candidate that was tried, so the
//! caller can explain why earlier candidates were passed over.

use super::model::{BuildPlan, BuildpackRef, Group};
use serde::Serialize;
use std::fmt;

/// Why a candidate group did not win.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Disqualification {
    RequiredBuildpackFailed { buildpack: BuildpackRef },
    UnsatisfiedRequirement { name: String, required_by: BuildpackRef },
    NoBuildpacks,
}

impl fmt::Display for Disqualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disqualification::RequiredBuildpackFailed { buildpack } => {
                write!(f, "required buildpack {} failed detection", buildpack)
            }
            Disqualification::UnsatisfiedRequirement { name, required_by } => {
                write!(f, "{} requires {} but no buildpack provides it", required_by, name)
            }
            Disqualification::NoBuildpacks => write!(f, "no buildpacks passed detection"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Passed,
    Failed,
    Errored { message: String },
    /// Not attempted (or cancelled) after a required member failed
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberTrace {
    pub buildpack: BuildpackRef,
    pub status: MemberStatus,

    /// Candidates of a composite buildpack's own order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<CandidateTrace>,
}

impl MemberTrace {
    pub fn skipped(buildpack: &BuildpackRef) -> Self {
        Self {
            buildpack: buildpack.clone(),
            status: MemberStatus::Skipped,
            nested: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateTrace {
    /// Position of the candidate within its order
    pub index: usize,
    pub members: Vec<MemberTrace>,
    pub disqualified: Option<Disqualification>,
}

impl CandidateTrace {
    pub fn passed(&self) -> bool {
        self.disqualified.is_none()
    }
}

/// Final outcome of resolving an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionResult {
    Success {
        group: Group,
        plan: BuildPlan,
        trace: Vec<CandidateTrace>,
    },
    Exhausted {
        trace: Vec<CandidateTrace>,
    },
}

impl ResolutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionResult::Success { .. })
    }

    pub fn group(&self) -> Option<&Group> {
        match self {
            ResolutionResult::Success { group, .. } => Some(group),
            ResolutionResult::Exhausted { .. } => None,
        }
    }

    pub fn plan(&self) -> Option<&BuildPlan> {
        match self {
            ResolutionResult::Success { plan, .. } => Some(plan),
            ResolutionResult::Exhausted { .. } => None,
        }
    }

    pub fn trace(&self) -> &[CandidateTrace] {
        match self {
            ResolutionResult::Success { trace, .. } => trace,
            ResolutionResult::Exhausted { trace } => trace,
        }
    }

    /// Disqualification reason of every top-level candidate that lost.
    pub fn failures(&self) -> Vec<(usize, &Disqualification)> {
        self.trace()
            .iter()
            .filter_map(|c| c.disqualified.as_ref().map(|d| (c.index, d)))
            .collect()
    }
}
