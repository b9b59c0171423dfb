//! originfs-fs: Path-Oriented Facade Layer
//!
//! This layer turns the capability handles of `originfs-handle-store` into
//! one uniform, path-addressed file interface:
//!
//! - [`Path`]: slash-delimited paths with structural `.`/`..` segments
//! - [`FileSystem`]: `write_file`, `read_file`, `read_dir`, `unlink`,
//!   `mkdir` - all suspending, all stateless request/response
//! - [`Error`]: the facade's error taxonomy (invalid path, not found, lock
//!   contention, backend failure), each carrying the path involved
//!
//! The backend's two execution contexts (worker-style synchronous sessions
//! vs. main-style streaming sessions) are bridged internally: the facade
//! probes the backend once at construction and drives the matching access
//! protocol from then on, producing byte-for-byte identical results either
//! way.
//!
//! # Example
//!
//! ```rust
//! use originfs_fs::FileSystem;
//! use originfs_mem_store::MemBackend;
//!
//! # async fn demo() -> Result<(), originfs_fs::Error> {
//! let fs = FileSystem::new(MemBackend::new());
//!
//! fs.write_file("/cool/what/do/you/mean.js", "What!!!!").await?;
//! let bytes = fs.read_file("/cool/what/do/you/mean.js").await?;
//! assert_eq!(&bytes[..], b"What!!!!");
//! # Ok(())
//! # }
//! ```

pub use bytes::Bytes;

mod error;
mod fs;
mod path;
mod protocol;
mod resolver;

pub use error::Error;
pub use fs::FileSystem;
pub use path::{Path, PathError, Segment};

// Re-export handle types for convenience
pub use originfs_handle_store::{
    AsyncSession, DirectoryHandle, EntryIter, FileHandle, HandleError, Snapshot, StorageBackend,
    SyncSession,
};
