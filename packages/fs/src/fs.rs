//! The public facade: five path-addressed operations.

use bytes::Bytes;

use originfs_handle_store::StorageBackend;

use crate::error::Error;
use crate::path::Path;
use crate::protocol::{AccessProtocol, StreamAccessProtocol, SyncAccessProtocol};
use crate::resolver;

/// A path-oriented file system over a capability-based storage backend.
///
/// Construction probes the backend once for its execution context (worker
/// contexts offer synchronous sessions, main contexts only streaming ones)
/// and fixes the matching access protocol for the facade's lifetime. Every
/// operation re-resolves its handles from the root - nothing is cached
/// between calls, so there is no stale-handle hazard at the cost of
/// re-traversal bounded by path length.
///
/// # Example
///
/// ```rust,ignore
/// use originfs_fs::FileSystem;
/// use originfs_mem_store::MemBackend;
///
/// let fs = FileSystem::new(MemBackend::new());
/// fs.write_file("/notes/today.txt", "hello").await?;
/// let bytes = fs.read_file("/notes/today.txt").await?;
/// ```
pub struct FileSystem<B: StorageBackend> {
    backend: B,
    protocol: Box<dyn AccessProtocol>,
}

impl<B: StorageBackend> FileSystem<B> {
    /// Wrap a backend, selecting the access protocol for its context.
    pub fn new(backend: B) -> Self {
        let protocol: Box<dyn AccessProtocol> = if backend.supports_sync_access() {
            Box::new(SyncAccessProtocol)
        } else {
            Box::new(StreamAccessProtocol)
        };

        FileSystem { backend, protocol }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Write `data` as the full content of the file at `path`.
    ///
    /// Text input is written as its UTF-8 bytes. Missing directories along
    /// the path, and the file itself, are created as needed. The previous
    /// content is fully replaced, in either context.
    pub async fn write_file(&self, path: &str, data: impl AsRef<[u8]>) -> Result<(), Error> {
        let data = Bytes::copy_from_slice(data.as_ref());
        let parsed = Path::parse(path);
        let (dir_path, leaf) = parsed
            .split_leaf()
            .map_err(|e| Error::invalid_path(path, e))?;

        let (_dir, file) = resolver::resolve_file(&self.backend, &dir_path, leaf, true)
            .await
            .map_err(|e| Error::classify(path, e))?;

        let len = data.len();
        self.protocol
            .write_all(file.as_ref(), data)
            .await
            .map_err(|e| Error::classify(path, e))?;

        log::debug!("wrote {} bytes to {}", len, path);
        Ok(())
    }

    /// Read the full content of the file at `path`.
    ///
    /// Fails with [`Error::NotFound`] if the file does not exist; reading
    /// never creates the file. The returned length equals the file's current
    /// stored size; any text decoding is the caller's business.
    pub async fn read_file(&self, path: &str) -> Result<Bytes, Error> {
        let parsed = Path::parse(path);
        let (dir_path, leaf) = parsed
            .split_leaf()
            .map_err(|e| Error::invalid_path(path, e))?;

        let (_dir, file) = resolver::resolve_file(&self.backend, &dir_path, leaf, false)
            .await
            .map_err(|e| Error::classify(path, e))?;

        let data = self
            .protocol
            .read_all(file.as_ref())
            .await
            .map_err(|e| Error::classify(path, e))?;

        log::debug!("read {} bytes from {}", data.len(), path);
        Ok(data)
    }

    /// List the entry names of the directory at `path`.
    ///
    /// Names only, no metadata, in the backend's iteration order. The
    /// listing is collected eagerly; a fresh call re-resolves and
    /// re-iterates.
    pub async fn read_dir(&self, path: &str) -> Result<Vec<String>, Error> {
        let parsed = Path::parse(path);
        let dir = resolver::resolve_dir(&self.backend, &parsed)
            .await
            .map_err(|e| Error::classify(path, e))?;

        let mut iter = dir
            .entries()
            .await
            .map_err(|e| Error::classify(path, e))?;

        let mut names = Vec::new();
        while let Some(name) = iter
            .next_entry()
            .await
            .map_err(|e| Error::classify(path, e))?
        {
            names.push(name);
        }

        Ok(names)
    }

    /// Remove the leaf entry at `path` from its parent directory.
    ///
    /// Fails with [`Error::NotFound`] if the entry is absent.
    pub async fn unlink(&self, path: &str) -> Result<(), Error> {
        let parsed = Path::parse(path);
        let (dir_path, leaf) = parsed
            .split_leaf()
            .map_err(|e| Error::invalid_path(path, e))?;

        let dir = resolver::resolve_dir(&self.backend, &dir_path)
            .await
            .map_err(|e| Error::classify(path, e))?;

        dir.remove_entry(leaf)
            .await
            .map_err(|e| Error::classify(path, e))?;

        log::debug!("unlinked {}", path);
        Ok(())
    }

    /// Create the directory at `path`, including missing parents.
    ///
    /// Idempotent: an existing directory succeeds unchanged.
    pub async fn mkdir(&self, path: &str) -> Result<(), Error> {
        let parsed = Path::parse(path);
        resolver::resolve_dir(&self.backend, &parsed)
            .await
            .map_err(|e| Error::classify(path, e))?;
        Ok(())
    }
}
