//! Directory and file handle implementations.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;

use originfs_handle_store::{
    AsyncSession, DirectoryHandle, EntryIter, FileHandle, HandleError, Snapshot, SyncSession,
};

use crate::node::{lock, scan_subtree, DirNode, FileNode, NodeEntry};
use crate::session::{MemAsyncSession, MemSnapshot, MemSyncSession};
use crate::Shared;

/// Handle to one directory node.
///
/// Each handle carries its chain of parent handles, so `parent()` needs no
/// global state and parent links are strictly upward by construction.
#[derive(Clone)]
pub(crate) struct MemDirHandle {
    pub(crate) shared: Arc<Shared>,
    pub(crate) node: Arc<DirNode>,
    pub(crate) parent: Option<Box<MemDirHandle>>,
}

#[async_trait]
impl DirectoryHandle for MemDirHandle {
    async fn child_dir(
        &self,
        name: &str,
        create_if_absent: bool,
    ) -> Result<Box<dyn DirectoryHandle>, HandleError> {
        let mut entries = lock(&self.node.entries)?;

        let node = match entries.get(name) {
            Some(NodeEntry::Dir(dir)) => dir.clone(),
            Some(NodeEntry::File(_)) => {
                return Err(HandleError::message(format!(
                    "entry '{}' is a file, not a directory",
                    name
                )))
            }
            None if create_if_absent => {
                let dir = Arc::new(DirNode::default());
                entries.insert(name.to_string(), NodeEntry::Dir(dir.clone()));
                dir
            }
            None => return Err(HandleError::NotFound),
        };

        Ok(Box::new(MemDirHandle {
            shared: self.shared.clone(),
            node,
            parent: Some(Box::new(self.clone())),
        }))
    }

    async fn parent(&self) -> Result<Box<dyn DirectoryHandle>, HandleError> {
        match &self.parent {
            Some(parent) => Ok(Box::new((**parent).clone())),
            None => Err(HandleError::NotFound),
        }
    }

    async fn file(
        &self,
        name: &str,
        create_if_absent: bool,
    ) -> Result<Box<dyn FileHandle>, HandleError> {
        let mut entries = lock(&self.node.entries)?;

        let node = match entries.get(name) {
            Some(NodeEntry::File(file)) => file.clone(),
            Some(NodeEntry::Dir(_)) => {
                return Err(HandleError::message(format!(
                    "entry '{}' is a directory, not a file",
                    name
                )))
            }
            None if create_if_absent => {
                let file = Arc::new(FileNode::default());
                entries.insert(name.to_string(), NodeEntry::File(file.clone()));
                file
            }
            None => return Err(HandleError::NotFound),
        };

        Ok(Box::new(MemFileHandle {
            shared: self.shared.clone(),
            node,
        }))
    }

    async fn remove_entry(&self, name: &str) -> Result<(), HandleError> {
        let mut entries = lock(&self.node.entries)?;

        let entry = entries.get(name).ok_or(HandleError::NotFound)?;
        let scan = scan_subtree(entry)?;
        if scan.any_locked {
            return Err(HandleError::LockContention);
        }

        entries.remove(name);
        self.shared.release(scan.bytes)?;
        Ok(())
    }

    async fn entries(&self) -> Result<Box<dyn EntryIter>, HandleError> {
        let entries = lock(&self.node.entries)?;
        let names: VecDeque<String> = entries.keys().cloned().collect();
        Ok(Box::new(MemEntryIter { names }))
    }
}

/// One-shot iterator over a name snapshot taken when `entries()` was called.
pub(crate) struct MemEntryIter {
    names: VecDeque<String>,
}

#[async_trait]
impl EntryIter for MemEntryIter {
    async fn next_entry(&mut self) -> Result<Option<String>, HandleError> {
        Ok(self.names.pop_front())
    }
}

/// Handle to one file node.
pub(crate) struct MemFileHandle {
    pub(crate) shared: Arc<Shared>,
    pub(crate) node: Arc<FileNode>,
}

impl MemFileHandle {
    /// Take the single-writer lock, returning the committed content for the
    /// session to stage from.
    fn acquire(&self) -> Result<Vec<u8>, HandleError> {
        let mut state = lock(&self.node.state)?;
        if state.locked {
            return Err(HandleError::LockContention);
        }
        state.locked = true;
        self.shared.note_open();
        Ok(state.content.to_vec())
    }
}

#[async_trait]
impl FileHandle for MemFileHandle {
    async fn open_sync(&self) -> Result<Box<dyn SyncSession>, HandleError> {
        if !self.shared.sync_access {
            return Err(HandleError::Unsupported);
        }
        let scratch = self.acquire()?;
        Ok(Box::new(MemSyncSession::new(
            self.shared.clone(),
            self.node.clone(),
            scratch,
        )))
    }

    async fn open_async(&self) -> Result<Box<dyn AsyncSession>, HandleError> {
        if self.shared.sync_access {
            return Err(HandleError::Unsupported);
        }
        self.acquire()?;
        Ok(Box::new(MemAsyncSession::new(
            self.shared.clone(),
            self.node.clone(),
        )))
    }

    async fn snapshot(&self) -> Result<Box<dyn Snapshot>, HandleError> {
        if self.shared.sync_access {
            return Err(HandleError::Unsupported);
        }
        let state = lock(&self.node.state)?;
        if state.locked {
            return Err(HandleError::LockContention);
        }
        Ok(Box::new(MemSnapshot::new(state.content.clone())))
    }
}

#[cfg(test)]
mod tests {
    use originfs_handle_store::{HandleError, StorageBackend};

    use crate::MemBackend;

    #[tokio::test]
    async fn child_dir_create_and_lookup() {
        let backend = MemBackend::new();
        let root = backend.root().await.unwrap();

        assert!(matches!(
            root.child_dir("a", false).await,
            Err(HandleError::NotFound)
        ));

        root.child_dir("a", true).await.unwrap();
        root.child_dir("a", false).await.unwrap();
    }

    #[tokio::test]
    async fn parent_chain_walks_upward() {
        let backend = MemBackend::new();
        let root = backend.root().await.unwrap();

        let a = root.child_dir("a", true).await.unwrap();
        let b = a.child_dir("b", true).await.unwrap();

        let back_at_a = b.parent().await.unwrap();
        back_at_a.child_dir("b", false).await.unwrap();

        let back_at_root = back_at_a.parent().await.unwrap();
        assert!(matches!(
            back_at_root.parent().await,
            Err(HandleError::NotFound)
        ));
    }

    #[tokio::test]
    async fn kind_mismatch_is_a_backend_fault() {
        let backend = MemBackend::new();
        let root = backend.root().await.unwrap();

        root.file("thing", true).await.unwrap();
        assert!(matches!(
            root.child_dir("thing", false).await,
            Err(HandleError::Backend(_))
        ));
        assert!(matches!(
            root.child_dir("thing", true).await,
            Err(HandleError::Backend(_))
        ));

        root.child_dir("dir", true).await.unwrap();
        assert!(matches!(
            root.file("dir", true).await,
            Err(HandleError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn remove_entry_behavior() {
        let backend = MemBackend::new();
        let root = backend.root().await.unwrap();

        assert!(matches!(
            root.remove_entry("ghost").await.unwrap_err(),
            HandleError::NotFound
        ));

        root.file("f", true).await.unwrap();
        root.remove_entry("f").await.unwrap();
        assert!(matches!(
            root.file("f", false).await,
            Err(HandleError::NotFound)
        ));
    }

    #[tokio::test]
    async fn remove_entry_refuses_locked_files() {
        let backend = MemBackend::new();
        let root = backend.root().await.unwrap();

        let file = root.file("busy", true).await.unwrap();
        let mut session = file.open_sync().await.unwrap();

        assert!(matches!(
            root.remove_entry("busy").await.unwrap_err(),
            HandleError::LockContention
        ));

        session.close().unwrap();
        root.remove_entry("busy").await.unwrap();
    }

    #[tokio::test]
    async fn entry_iteration_is_ordered_and_one_shot() {
        let backend = MemBackend::new();
        let root = backend.root().await.unwrap();

        root.file("zeta", true).await.unwrap();
        root.file("alpha", true).await.unwrap();
        root.child_dir("mid", true).await.unwrap();

        let mut iter = root.entries().await.unwrap();
        let mut names = Vec::new();
        while let Some(name) = iter.next_entry().await.unwrap() {
            names.push(name);
        }
        assert_eq!(names, ["alpha", "mid", "zeta"]);

        // Exhausted iterators stay exhausted.
        assert!(iter.next_entry().await.unwrap().is_none());
    }
}
