//! Error types for the handle layer.
//!
//! Errors at this level are backend-focused. No path strings, no operation
//! context - those belong in higher layers, which attach them when they
//! classify these errors for callers.

/// Errors reported by a storage backend through its capability handles.
#[derive(Debug)]
pub enum HandleError {
    /// The named entry does not exist, or a parent lookup was attempted at
    /// the root of the storage graph.
    NotFound,

    /// The target file is held by another access session.
    ///
    /// Backends of this class enforce single-writer-per-file locking; the
    /// lock is released when the holding session closes.
    LockContention,

    /// A session operation was attempted after `close`.
    ///
    /// The open -> use -> close lifecycle is strictly linear; `close` is
    /// terminal.
    AlreadyClosed,

    /// The requested capability is not available in this execution context.
    ///
    /// For example, opening a sync session against a backend that only
    /// offers the streaming protocol.
    Unsupported,

    /// The backend's storage budget is exhausted.
    QuotaExceeded,

    /// Any other backend-reported fault (I/O fault, permission denial, ...).
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl HandleError {
    /// Construct a [`HandleError::Backend`] from a plain message.
    pub fn message(msg: impl Into<String>) -> Self {
        HandleError::Backend(msg.into().into())
    }
}

impl std::fmt::Display for HandleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleError::NotFound => write!(f, "entry not found"),
            HandleError::LockContention => {
                write!(f, "file is held by another access session")
            }
            HandleError::AlreadyClosed => write!(f, "access session is already closed"),
            HandleError::Unsupported => {
                write!(f, "capability not available in this execution context")
            }
            HandleError::QuotaExceeded => write!(f, "storage quota exceeded"),
            HandleError::Backend(e) => write!(f, "backend failure: {}", e),
        }
    }
}

impl std::error::Error for HandleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandleError::Backend(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HandleError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => HandleError::NotFound,
            _ => HandleError::Backend(Box::new(e)),
        }
    }
}
