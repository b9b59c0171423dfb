//! Facade-level error taxonomy.

use originfs_handle_store::HandleError;

use crate::path::PathError;

/// Errors surfaced by the facade's public operations.
///
/// Every error carries the path string the caller supplied. Backend failures
/// propagate unchanged in class - the facade performs no retries and no local
/// recovery, and a failed operation never reports partial success.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed path, or an empty leaf where a file name is required.
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// `..` beyond the root, a removal of an absent entry, or any other
    /// backend-reported missing-entry condition.
    #[error("not found: '{path}'")]
    NotFound { path: String },

    /// The backend reports the target is held by another writer or session.
    #[error("lock contention on '{path}'")]
    LockContention { path: String },

    /// Any other backend-reported fault (quota exceeded, I/O fault,
    /// permission denial).
    #[error("backend failure on '{path}': {source}")]
    Backend {
        path: String,
        #[source]
        source: HandleError,
    },
}

impl Error {
    /// Classify a backend error, attaching the path it occurred on.
    pub(crate) fn classify(path: &str, e: HandleError) -> Error {
        match e {
            HandleError::NotFound => Error::NotFound { path: path.into() },
            HandleError::LockContention => Error::LockContention { path: path.into() },
            other => Error::Backend {
                path: path.into(),
                source: other,
            },
        }
    }

    pub(crate) fn invalid_path(path: &str, e: PathError) -> Error {
        Error::InvalidPath {
            path: path.into(),
            message: e.to_string(),
        }
    }
}
