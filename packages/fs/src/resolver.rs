//! Path resolution: from a parsed path to capability handles.
//!
//! Resolution always starts at a freshly fetched root and walks one segment
//! at a time. Name segments are resolved with create-if-absent semantics, so
//! resolving a directory path creates missing intermediates as it goes
//! ("create parents as needed"). Handles are never cached between calls - no
//! handle outlives a single public operation.

use originfs_handle_store::{DirectoryHandle, FileHandle, HandleError, StorageBackend};

use crate::path::{Path, Segment};

/// Walk `path` from the backend's root, returning the final directory handle.
///
/// `.` is a no-op, `..` is a parent lookup (the backend's NotFound at the
/// root surfaces here, never swallowed), and any other name is a get-or-create
/// child directory. A root-only path resolves to the root handle itself.
pub(crate) async fn resolve_dir<B: StorageBackend>(
    backend: &B,
    path: &Path,
) -> Result<Box<dyn DirectoryHandle>, HandleError> {
    let mut current = backend.root().await?;

    for segment in path.segments() {
        current = match segment {
            Segment::Current => current,
            Segment::Parent => current.parent().await?,
            Segment::Name(name) => current.child_dir(name, true).await?,
        };
    }

    Ok(current)
}

/// Resolve the parent directory of a file path and obtain the leaf handle.
///
/// The caller has already split off the leaf name (see
/// [`Path::split_leaf`]); `create` controls whether an absent leaf is
/// implicitly created or reported as NotFound. Intermediate directories are
/// created on traversal either way.
pub(crate) async fn resolve_file<B: StorageBackend>(
    backend: &B,
    dir_path: &Path,
    leaf: &str,
    create: bool,
) -> Result<(Box<dyn DirectoryHandle>, Box<dyn FileHandle>), HandleError> {
    let dir = resolve_dir(backend, dir_path).await?;
    let file = dir.file(leaf, create).await?;
    Ok((dir, file))
}
