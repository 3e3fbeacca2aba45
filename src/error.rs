//! Hard failures surfaced to the caller. Per-entry problems during a walk are not errors;
//! they are collected as [`Diagnostic`](crate::pipeline::Diagnostic)s instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// Persisted snapshot is missing a field, has a field of the wrong shape, or is not JSON.
    #[error("malformed audit data at `{node}`: field `{field}` {problem}")]
    MalformedData {
        node: String,
        field: String,
        problem: String,
    },

    /// A tree could not be encoded as JSON.
    #[error("could not encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    /// The worker pool for a parallel audit could not be started.
    #[error("could not start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("audit root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl AuditError {
    pub(crate) fn malformed(
        node: impl Into<String>,
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        AuditError::MalformedData {
            node: node.into(),
            field: field.into(),
            problem: problem.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::Io {
            path: path.into(),
            source,
        }
    }
}
