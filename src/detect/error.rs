use std::path::PathBuf;
use thiserror::Error;

/// Malformed order input, reported before any buildpack is detected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("buildpack {id} appears more than once in a group ({context})")]
    DuplicateBuildpack { id: String, context: String },

    #[error("composite buildpack {id} declares an empty order")]
    EmptyOrder { id: String },

    #[error("buildpack {id} includes itself ({path})")]
    Cycle { id: String, path: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Failure to look up a buildpack's descriptor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("buildpack {id}@{version} not found")]
    NotFound { id: String, version: String },

    #[error("invalid buildpack descriptor {}: {message}", path.display())]
    InvalidDescriptor { path: PathBuf, message: String },
}

/// The executor could not run a buildpack's detection at all. This is
/// different from a buildpack reporting that it does not apply.
#[derive(Debug, Error)]
pub enum DetectionExecutionError {
    #[error("failed to run detect for {buildpack}: {source}")]
    Spawn {
        buildpack: String,
        #[source]
        source: std::io::Error,
    },

    #[error("detect for {buildpack} timed out after {seconds}s")]
    Timeout { buildpack: String, seconds: u64 },

    #[error("detect for {buildpack} exited with unexpected status {status}")]
    UnexpectedExit { buildpack: String, status: String },

    #[error("detect for {buildpack} wrote an invalid plan: {message}")]
    InvalidPlan { buildpack: String, message: String },

    #[error("{0}")]
    Other(String),
}
