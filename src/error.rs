//! Error types for the formatting run
//!
//! Only run-level failures live here. Per-file read and write errors are
//! reported and skipped by the pipeline, and syntax errors are carried by
//! [`crate::validator::Diagnostic`].

use std::path::PathBuf;
use thiserror::Error;

/// The file tree under the base directory could not be enumerated
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Unable to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{root} is not a directory")]
    NotADirectory { root: PathBuf },
}

/// A failure that ends the run before every file was visited
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Formatter rejected {path}, which passed validation: {cause:#}")]
    Format { path: PathBuf, cause: anyhow::Error },

    #[error("Unable to write report: {0}")]
    Report(#[from] std::io::Error),
}
