//! Buildpack group detection
//!
//! Given an [`Order`] of candidate groups, finds the first group whose
//! buildpacks pass detection and whose requirements are all provided, and
//! assembles its [`BuildPlan`]. Running buildpacks is left to a
//! [`BuildpackDetector`]; this module only decides between outcomes.

pub mod collector;
pub mod error;
pub mod mock;
pub mod model;
pub mod plan;
pub mod report;
pub mod resolver;
pub mod tree;

pub use collector::{BuildpackDetector, CollectedOutcome, ExecutionContext, OutcomeCollector};
pub use error::{CatalogError, ConfigurationError, DetectionExecutionError};
pub use mock::{MockDetection, MockDetector};
pub use model::{
    BuildPlan, BuildPlanEntry, BuildpackRef, DetectionOutcome, Group, Order, Provision,
    Requirement,
};
pub use plan::{
    assemble, check_closure, select_members, select_survivors, winning_group, Contribution,
    MemberAttempt,
};
pub use report::{CandidateTrace, Disqualification, MemberStatus, MemberTrace, ResolutionResult};
pub use resolver::{DetectStrategy, GroupResolver};
pub use tree::{
    BuildpackCatalog, BuildpackNode, CompositeBuildpack, InMemoryCatalog, TreeGroup, TreeMember,
    TreeOrder,
};
