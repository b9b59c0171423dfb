//! originfs: a uniform path-addressed file interface over capability-based,
//! origin-scoped storage.
//!
//! The backend is reachable only through a root directory handle, and its
//! read/write protocol differs by execution context (synchronous positional
//! sessions in worker-style contexts, streaming sessions and snapshots in
//! main-style contexts). [`FileSystem`] hides the split behind five
//! path-addressed operations - `write_file`, `read_file`, `read_dir`,
//! `unlink`, `mkdir` - that behave byte-for-byte identically in either
//! context.
//!
//! The layers are re-exported here: the capability traits from
//! `originfs-handle-store`, the facade from `originfs-fs`, and the
//! in-memory backend from `originfs-mem-store`.

pub use originfs_fs::{Bytes, Error, FileSystem, Path, PathError, Segment};
pub use originfs_handle_store::{
    AsyncSession, DirectoryHandle, EntryIter, FileHandle, HandleError, Snapshot, StorageBackend,
    SyncSession,
};
pub use originfs_mem_store::MemBackend;
