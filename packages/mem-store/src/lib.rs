//! originfs-mem-store: In-Memory Capability Store
//!
//! A complete in-memory implementation of the `originfs-handle-store`
//! capability interface, for tests and for callers that want origin-style
//! storage semantics without a platform backend:
//!
//! - Directory graph with strictly-upward parent links
//! - Single-writer-per-file session locking (`LockContention` on conflict)
//! - Both access protocols: synchronous positional sessions (worker-style
//!   contexts) and streaming sessions plus read snapshots (main-style
//!   contexts) - one backend value offers exactly one of the two, chosen at
//!   construction, mirroring how a real execution context works
//! - Optional total-byte quota, enforced when content commits
//! - One-shot write-fault injection and session open/close accounting, so
//!   session-discipline tests can observe exactly what happened
//!
//! # Example
//!
//! ```rust
//! use originfs_mem_store::MemBackend;
//! use originfs_handle_store::StorageBackend;
//!
//! # async fn demo() -> Result<(), originfs_handle_store::HandleError> {
//! let backend = MemBackend::new().with_quota(1024);
//! let root = backend.root().await?;
//! root.file("hello.txt", true).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use originfs_handle_store::{DirectoryHandle, HandleError, StorageBackend};

mod handle;
mod node;
mod session;

use handle::MemDirHandle;
use node::{lock, DirNode};

/// State shared by every handle and session of one backend.
pub(crate) struct Shared {
    pub(crate) sync_access: bool,
    quota: Option<u64>,
    used: Mutex<u64>,
    fail_next_write: AtomicBool,
    opens: AtomicU64,
    closes: AtomicU64,
}

impl Shared {
    /// Consume a pending injected fault, if one is armed.
    pub(crate) fn take_write_fault(&self) -> Result<(), HandleError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(HandleError::message("injected write fault"));
        }
        Ok(())
    }

    /// Re-account a file's committed size from `old` to `new` bytes,
    /// enforcing the quota. On failure nothing is charged and the caller
    /// must leave the old content in place.
    pub(crate) fn charge(&self, old: u64, new: u64) -> Result<(), HandleError> {
        let mut used = lock(&self.used)?;
        let next = used.saturating_sub(old) + new;
        if let Some(quota) = self.quota {
            if next > quota {
                return Err(HandleError::QuotaExceeded);
            }
        }
        *used = next;
        Ok(())
    }

    /// Give back `bytes` of committed content (entry removal).
    pub(crate) fn release(&self, bytes: u64) -> Result<(), HandleError> {
        let mut used = lock(&self.used)?;
        *used = used.saturating_sub(bytes);
        Ok(())
    }

    pub(crate) fn note_open(&self) {
        self.opens.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn note_close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// An in-memory, origin-style storage backend.
///
/// Cloning is cheap and clones share the same storage graph.
#[derive(Clone)]
pub struct MemBackend {
    shared: Arc<Shared>,
    root: Arc<DirNode>,
}

impl MemBackend {
    /// A worker-style backend: synchronous sessions available.
    pub fn new() -> Self {
        Self::with_context(true)
    }

    /// A main-style backend: streaming sessions and snapshots only.
    pub fn main_context() -> Self {
        Self::with_context(false)
    }

    fn with_context(sync_access: bool) -> Self {
        MemBackend {
            shared: Arc::new(Shared {
                sync_access,
                quota: None,
                used: Mutex::new(0),
                fail_next_write: AtomicBool::new(false),
                opens: AtomicU64::new(0),
                closes: AtomicU64::new(0),
            }),
            root: Arc::new(DirNode::default()),
        }
    }

    /// Cap total committed content at `bytes`. Exceeding the cap fails the
    /// committing call with `QuotaExceeded` and leaves prior content intact.
    pub fn with_quota(self, bytes: u64) -> Self {
        let used = self.shared.used.lock().map(|g| *g).unwrap_or(0);
        MemBackend {
            shared: Arc::new(Shared {
                sync_access: self.shared.sync_access,
                quota: Some(bytes),
                used: Mutex::new(used),
                fail_next_write: AtomicBool::new(false),
                opens: AtomicU64::new(self.shared.opens.load(Ordering::SeqCst)),
                closes: AtomicU64::new(self.shared.closes.load(Ordering::SeqCst)),
            }),
            root: self.root,
        }
    }

    /// Arm a one-shot failure: the next session write (either protocol)
    /// fails with a backend fault, leaving the session open.
    pub fn fail_next_write(&self) {
        self.shared.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// How many access sessions have been opened so far.
    pub fn sessions_opened(&self) -> u64 {
        self.shared.opens.load(Ordering::SeqCst)
    }

    /// How many access sessions have been closed so far. A disciplined
    /// caller closes every session exactly once, on every path.
    pub fn sessions_closed(&self) -> u64 {
        self.shared.closes.load(Ordering::SeqCst)
    }
}

impl Default for MemBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemBackend {
    async fn root(&self) -> Result<Box<dyn DirectoryHandle>, HandleError> {
        Ok(Box::new(MemDirHandle {
            shared: self.shared.clone(),
            node: self.root.clone(),
            parent: None,
        }))
    }

    fn supports_sync_access(&self) -> bool {
        self.shared.sync_access
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use originfs_handle_store::SyncSession;

    fn write_committed(session: &mut dyn SyncSession, data: &[u8]) {
        session.write_at(data, 0).unwrap();
        session.truncate(data.len() as u64).unwrap();
        session.flush().unwrap();
    }

    #[tokio::test]
    async fn quota_blocks_commit_and_preserves_content() {
        let backend = MemBackend::new().with_quota(8);
        let root = backend.root().await.unwrap();
        let file = root.file("f", true).await.unwrap();

        let mut session = file.open_sync().await.unwrap();
        write_committed(session.as_mut(), b"12345678");
        session.close().unwrap();

        let mut session = file.open_sync().await.unwrap();
        session.write_at(b"123456789", 0).unwrap();
        assert!(matches!(
            session.flush().unwrap_err(),
            HandleError::QuotaExceeded
        ));
        session.close().unwrap();

        // Old content survives a failed commit.
        let mut session = file.open_sync().await.unwrap();
        assert_eq!(session.size().unwrap(), 8);
        session.close().unwrap();
    }

    #[tokio::test]
    async fn quota_counts_the_whole_store() {
        let backend = MemBackend::new().with_quota(10);
        let root = backend.root().await.unwrap();

        let a = root.file("a", true).await.unwrap();
        let mut session = a.open_sync().await.unwrap();
        write_committed(session.as_mut(), b"123456");
        session.close().unwrap();

        let b = root.file("b", true).await.unwrap();
        let mut session = b.open_sync().await.unwrap();
        session.write_at(b"78901", 0).unwrap();
        assert!(matches!(
            session.flush().unwrap_err(),
            HandleError::QuotaExceeded
        ));
        session.close().unwrap();

        // Removal gives the budget back.
        root.remove_entry("a").await.unwrap();
        let mut session = b.open_sync().await.unwrap();
        write_committed(session.as_mut(), b"78901");
        session.close().unwrap();
    }

    #[tokio::test]
    async fn session_accounting_is_observable() {
        let backend = MemBackend::new();
        let root = backend.root().await.unwrap();
        let file = root.file("f", true).await.unwrap();

        assert_eq!(backend.sessions_opened(), 0);
        assert_eq!(backend.sessions_closed(), 0);

        let mut session = file.open_sync().await.unwrap();
        assert_eq!(backend.sessions_opened(), 1);
        session.close().unwrap();
        assert_eq!(backend.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn clones_share_the_graph() {
        let backend = MemBackend::new();
        let clone = backend.clone();

        let root = backend.root().await.unwrap();
        root.child_dir("shared", true).await.unwrap();

        let root = clone.root().await.unwrap();
        root.child_dir("shared", false).await.unwrap();
    }
}
