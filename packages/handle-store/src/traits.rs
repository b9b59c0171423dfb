//! Core traits for the handle layer.

use async_trait::async_trait;
use bytes::Bytes;

use crate::HandleError;

/// An origin-scoped storage backend, reachable only through its root handle.
///
/// The root is fetched fresh per call; backends own it and callers never
/// cache it across operations.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn StorageBackend>`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Obtain a handle to the root directory of the storage graph.
    async fn root(&self) -> Result<Box<dyn DirectoryHandle>, HandleError>;

    /// Whether this backend offers the synchronous session protocol.
    ///
    /// This is a pure environment probe: `true` in worker-style contexts
    /// where [`FileHandle::open_sync`] is available, `false` in main-style
    /// contexts that only offer [`FileHandle::open_async`] and
    /// [`FileHandle::snapshot`]. Callers consult it once, at startup, and
    /// never re-check mid-operation.
    fn supports_sync_access(&self) -> bool;
}

/// One named directory node in the storage graph.
///
/// Parent links are strictly upward, so the graph has no cycles by
/// construction. Handles are transient: they do not outlive the operation
/// that resolved them.
#[async_trait]
pub trait DirectoryHandle: Send + Sync {
    /// Resolve the child directory with the given name.
    ///
    /// # Returns
    ///
    /// * `Ok(handle)` - The child directory, created if absent when
    ///   `create_if_absent` is set.
    /// * `Err(HandleError::NotFound)` - Absent and `create_if_absent` was
    ///   `false`.
    async fn child_dir(
        &self,
        name: &str,
        create_if_absent: bool,
    ) -> Result<Box<dyn DirectoryHandle>, HandleError>;

    /// Resolve the parent directory.
    ///
    /// Fails with [`HandleError::NotFound`] if this handle is already the
    /// root.
    async fn parent(&self) -> Result<Box<dyn DirectoryHandle>, HandleError>;

    /// Resolve the file entry with the given name.
    ///
    /// With `create_if_absent` set, an empty file is created on first
    /// addressing; otherwise an absent entry is [`HandleError::NotFound`].
    async fn file(
        &self,
        name: &str,
        create_if_absent: bool,
    ) -> Result<Box<dyn FileHandle>, HandleError>;

    /// Remove the named entry from this directory.
    ///
    /// Fails with [`HandleError::NotFound`] if the entry is absent.
    async fn remove_entry(&self, name: &str) -> Result<(), HandleError>;

    /// Iterate the entry names of this directory.
    ///
    /// The iterator is lazy (each item is a suspension point), finite, and
    /// not restartable - callers wanting a second pass resolve the directory
    /// again.
    async fn entries(&self) -> Result<Box<dyn EntryIter>, HandleError>;
}

/// Lazy, one-shot iteration over a directory's entry names.
#[async_trait]
pub trait EntryIter: Send {
    /// Yield the next entry name, or `None` when exhausted.
    async fn next_entry(&mut self) -> Result<Option<String>, HandleError>;
}

/// Leaf node bound to a parent directory and a name.
///
/// A file handle does not itself hold byte content - content is reachable
/// only through an access session or a snapshot.
#[async_trait]
pub trait FileHandle: Send + Sync {
    /// Open a synchronous access session on this file.
    ///
    /// Available only where the backend reports
    /// [`StorageBackend::supports_sync_access`]; elsewhere this is
    /// [`HandleError::Unsupported`]. At most one session may be open per
    /// file - a concurrent holder is [`HandleError::LockContention`].
    async fn open_sync(&self) -> Result<Box<dyn SyncSession>, HandleError>;

    /// Open an asynchronous streaming session on this file.
    ///
    /// Main-context counterpart of [`open_sync`](Self::open_sync); the same
    /// single-writer lock applies.
    async fn open_async(&self) -> Result<Box<dyn AsyncSession>, HandleError>;

    /// Take a fixed point-in-time read snapshot of this file.
    ///
    /// Main-context read path; needs no session and holds no lock.
    async fn snapshot(&self) -> Result<Box<dyn Snapshot>, HandleError>;
}

/// Synchronous, position-based access to a file's bytes.
///
/// Writes are not durable until `flush` followed by `close`. The lifecycle
/// is strictly linear: open -> operations -> close, with close reached on
/// every exit path and called exactly once.
pub trait SyncSession: Send {
    /// Write `buf` at the given byte offset, returning how many bytes were
    /// accepted. Does not truncate: bytes beyond the written range survive.
    fn write_at(&mut self, buf: &[u8], offset: u64) -> Result<usize, HandleError>;

    /// Read into `buf` starting at the given byte offset, returning how many
    /// bytes were filled. Returns `Ok(0)` at or past end of file.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, HandleError>;

    /// Current size of the session's view of the file, in bytes.
    fn size(&self) -> Result<u64, HandleError>;

    /// Cut or zero-extend the file to exactly `len` bytes.
    fn truncate(&mut self, len: u64) -> Result<(), HandleError>;

    /// Make preceding writes durable.
    fn flush(&mut self) -> Result<(), HandleError>;

    /// Close the session, releasing the file lock. Terminal: any further
    /// call on this session is [`HandleError::AlreadyClosed`].
    fn close(&mut self) -> Result<(), HandleError>;
}

/// Asynchronous, whole-content streaming access to a file's bytes.
#[async_trait]
pub trait AsyncSession: Send {
    /// Append `data` to the replacement content. The first write implicitly
    /// discards the file's prior content; nothing is visible to readers
    /// until `close` commits.
    async fn write(&mut self, data: Bytes) -> Result<(), HandleError>;

    /// Commit the written content and release the file lock. Terminal.
    async fn close(&mut self) -> Result<(), HandleError>;
}

/// A fixed point-in-time view of a file's content.
#[async_trait]
pub trait Snapshot: Send + Sync {
    /// Size of the snapshot, in bytes.
    fn size(&self) -> u64;

    /// Materialize the full content of the snapshot.
    async fn read_all(&self) -> Result<Bytes, HandleError>;
}

// Blanket implementations so backends can be held behind references or boxes.

#[async_trait]
impl<T: StorageBackend + ?Sized> StorageBackend for &T {
    async fn root(&self) -> Result<Box<dyn DirectoryHandle>, HandleError> {
        (**self).root().await
    }

    fn supports_sync_access(&self) -> bool {
        (**self).supports_sync_access()
    }
}

#[async_trait]
impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    async fn root(&self) -> Result<Box<dyn DirectoryHandle>, HandleError> {
        self.as_ref().root().await
    }

    fn supports_sync_access(&self) -> bool {
        self.as_ref().supports_sync_access()
    }
}

#[async_trait]
impl<T: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<T> {
    async fn root(&self) -> Result<Box<dyn DirectoryHandle>, HandleError> {
        self.as_ref().root().await
    }

    fn supports_sync_access(&self) -> bool {
        self.as_ref().supports_sync_access()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A backend with an empty, read-only root. Enough to exercise object
    /// safety and the blanket impls.
    struct EmptyBackend;

    struct EmptyRoot;

    struct NoEntries;

    #[async_trait]
    impl StorageBackend for EmptyBackend {
        async fn root(&self) -> Result<Box<dyn DirectoryHandle>, HandleError> {
            Ok(Box::new(EmptyRoot))
        }

        fn supports_sync_access(&self) -> bool {
            false
        }
    }

    #[async_trait]
    impl DirectoryHandle for EmptyRoot {
        async fn child_dir(
            &self,
            _name: &str,
            _create_if_absent: bool,
        ) -> Result<Box<dyn DirectoryHandle>, HandleError> {
            Err(HandleError::Unsupported)
        }

        async fn parent(&self) -> Result<Box<dyn DirectoryHandle>, HandleError> {
            Err(HandleError::NotFound)
        }

        async fn file(
            &self,
            _name: &str,
            _create_if_absent: bool,
        ) -> Result<Box<dyn FileHandle>, HandleError> {
            Err(HandleError::Unsupported)
        }

        async fn remove_entry(&self, _name: &str) -> Result<(), HandleError> {
            Err(HandleError::NotFound)
        }

        async fn entries(&self) -> Result<Box<dyn EntryIter>, HandleError> {
            Ok(Box::new(NoEntries))
        }
    }

    #[async_trait]
    impl EntryIter for NoEntries {
        async fn next_entry(&mut self) -> Result<Option<String>, HandleError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn object_safety_works() {
        let backend: Box<dyn StorageBackend> = Box::new(EmptyBackend);
        let root = backend.root().await.unwrap();

        let mut iter = root.entries().await.unwrap();
        assert!(iter.next_entry().await.unwrap().is_none());

        assert!(matches!(root.parent().await, Err(HandleError::NotFound)));
    }

    #[tokio::test]
    async fn blanket_impls_work() {
        let backend = EmptyBackend;

        let by_ref: &dyn StorageBackend = &backend;
        assert!(!by_ref.supports_sync_access());
        by_ref.root().await.unwrap();

        let arced = std::sync::Arc::new(EmptyBackend);
        arced.root().await.unwrap();
    }
}
