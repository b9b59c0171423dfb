//! originfs-handle-store: Capability Handle Traits
//!
//! This is the narrow waist of the originfs stack. Everything at this level
//! is capability handles and raw bytes - no path strings, no traversal
//! semantics, no policy.
//!
//! A storage backend of this class is reachable only through a root directory
//! handle. Directory handles resolve children and parents, file handles open
//! access sessions, and byte content is reachable only through a session or a
//! read snapshot. Handles are opaque: they grant access to exactly one node
//! of the storage graph and are obtained only by traversal from the root.
//!
//! Two access protocols coexist, depending on execution context:
//!
//! - **Sync sessions** ([`SyncSession`]): position-based reads and writes
//!   with explicit `flush` and `close`. Available only where the backend
//!   reports [`StorageBackend::supports_sync_access`].
//! - **Async sessions** ([`AsyncSession`]) and [`Snapshot`]s: whole-content
//!   streaming writes committed on `close`, and fixed point-in-time reads.
//!
//! Higher layers decide which protocol to drive; this crate only describes
//! the capabilities.

pub use bytes::Bytes;

mod error;
mod traits;

pub use error::HandleError;
pub use traits::{
    AsyncSession, DirectoryHandle, EntryIter, FileHandle, Snapshot, StorageBackend, SyncSession,
};
