//! buildpack-detector - picks the buildpack group that can build an application
//!
//! Given an ordered list of candidate buildpack groups, the detector runs
//! each buildpack's detection step against the application, keeps the first
//! group whose required members pass and whose requirements are all provided
//! by its members, and assembles the build plan for that group.
//!
//! # Core Concepts
//!
//! - **Order**: candidate groups, tried first to last
//! - **Composite buildpacks**: buildpacks that are themselves an order of
//!   groups, resolved recursively and flattened into the winning group
//! - **Build plan**: each requirement of the winning group paired with the
//!   buildpacks that provide it
//!
//! # Example Usage
//!
//! ```
//! use buildpack_detector::detect::{
//!     BuildpackRef, DetectionOutcome, ExecutionContext, Group, GroupResolver, InMemoryCatalog,
//!     MockDetector, Order, Requirement,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let detector = MockDetector::new().with_outcome(
//!     "node",
//!     DetectionOutcome::pass()
//!         .providing("node")
//!         .requiring(Requirement::new("node")),
//! );
//! let resolver = GroupResolver::new(
//!     detector,
//!     Arc::new(InMemoryCatalog::new()),
//!     ExecutionContext::new("/workspace", "/platform", "/cnb/buildpacks"),
//! );
//!
//! let order = Order::new(vec![Group::new(vec![BuildpackRef::new("node", "1.0")])]);
//! let result = resolver.resolve(&order).await.unwrap();
//! assert!(result.is_success());
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`detect`]: resolution engine, plan assembly and the detector abstraction
//! - [`platform`]: order files, buildpack descriptors, `bin/detect` execution
//!   and result files
//! - [`cli`]: argument parsing, output rendering and the command handler

pub mod cli;
pub mod config;
pub mod detect;
pub mod platform;
pub mod util;

pub use config::{ConfigError, DetectorConfig};
pub use detect::{
    BuildPlan, BuildpackDetector, BuildpackRef, ConfigurationError, DetectStrategy,
    DetectionOutcome, Group, GroupResolver, Order, ResolutionResult,
};
pub use platform::{DirectoryCatalog, ProcessDetector};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
