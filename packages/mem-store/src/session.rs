//! Access session implementations: staged writes, commit on flush/close.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use originfs_handle_store::{AsyncSession, HandleError, Snapshot, SyncSession};

use crate::node::{lock, FileNode};
use crate::Shared;

/// Synchronous positional session.
///
/// Operations work on a scratch copy of the content; `flush` publishes the
/// scratch to the node (with quota accounting), and `close` without a flush
/// discards whatever was staged since - modelling the protocol's "durable
/// only after flush + close" caveat.
pub(crate) struct MemSyncSession {
    shared: Arc<Shared>,
    node: Arc<FileNode>,
    scratch: Vec<u8>,
    closed: bool,
}

impl MemSyncSession {
    pub(crate) fn new(shared: Arc<Shared>, node: Arc<FileNode>, scratch: Vec<u8>) -> Self {
        MemSyncSession {
            shared,
            node,
            scratch,
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<(), HandleError> {
        if self.closed {
            return Err(HandleError::AlreadyClosed);
        }
        Ok(())
    }
}

impl SyncSession for MemSyncSession {
    fn write_at(&mut self, buf: &[u8], offset: u64) -> Result<usize, HandleError> {
        self.ensure_open()?;
        self.shared.take_write_fault()?;

        let offset = offset as usize;
        let end = offset + buf.len();
        if end > self.scratch.len() {
            self.scratch.resize(end, 0);
        }
        self.scratch[offset..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, HandleError> {
        self.ensure_open()?;

        let offset = offset as usize;
        if offset >= self.scratch.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.scratch.len() - offset);
        buf[..n].copy_from_slice(&self.scratch[offset..offset + n]);
        Ok(n)
    }

    fn size(&self) -> Result<u64, HandleError> {
        self.ensure_open()?;
        Ok(self.scratch.len() as u64)
    }

    fn truncate(&mut self, len: u64) -> Result<(), HandleError> {
        self.ensure_open()?;
        self.scratch.resize(len as usize, 0);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), HandleError> {
        self.ensure_open()?;

        let mut state = lock(&self.node.state)?;
        self.shared
            .charge(state.content.len() as u64, self.scratch.len() as u64)?;
        state.content = Bytes::from(self.scratch.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), HandleError> {
        self.ensure_open()?;
        self.closed = true;

        let mut state = lock(&self.node.state)?;
        state.locked = false;
        drop(state);

        self.shared.note_close();
        Ok(())
    }
}

impl Drop for MemSyncSession {
    fn drop(&mut self) {
        // A dropped-but-unclosed session must not leak the file lock, but it
        // does not count as a close: the accounting exists so tests can catch
        // exactly this kind of discipline violation.
        if !self.closed {
            if let Ok(mut state) = self.node.state.lock() {
                state.locked = false;
            }
        }
    }
}

/// Asynchronous streaming session.
///
/// Writes accumulate the replacement content; `close` commits it as the
/// file's new content (full replace) and releases the lock. A session that
/// saw a write failure stages nothing durable: close still releases the lock
/// and counts, but leaves the prior content in place.
pub(crate) struct MemAsyncSession {
    shared: Arc<Shared>,
    node: Arc<FileNode>,
    staged: Vec<u8>,
    faulted: bool,
    closed: bool,
}

impl MemAsyncSession {
    pub(crate) fn new(shared: Arc<Shared>, node: Arc<FileNode>) -> Self {
        MemAsyncSession {
            shared,
            node,
            staged: Vec::new(),
            faulted: false,
            closed: false,
        }
    }
}

#[async_trait]
impl AsyncSession for MemAsyncSession {
    async fn write(&mut self, data: Bytes) -> Result<(), HandleError> {
        if self.closed {
            return Err(HandleError::AlreadyClosed);
        }
        if let Err(e) = self.shared.take_write_fault() {
            self.faulted = true;
            return Err(e);
        }
        self.staged.extend_from_slice(&data);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), HandleError> {
        if self.closed {
            return Err(HandleError::AlreadyClosed);
        }
        self.closed = true;

        let mut state = lock(&self.node.state)?;
        let commit = if self.faulted {
            Ok(())
        } else {
            let commit = self
                .shared
                .charge(state.content.len() as u64, self.staged.len() as u64);
            if commit.is_ok() {
                state.content = Bytes::from(std::mem::take(&mut self.staged));
            }
            commit
        };
        state.locked = false;
        drop(state);

        self.shared.note_close();
        commit
    }
}

impl Drop for MemAsyncSession {
    fn drop(&mut self) {
        if !self.closed {
            if let Ok(mut state) = self.node.state.lock() {
                state.locked = false;
            }
        }
    }
}

/// Fixed point-in-time view of a file's committed content.
pub(crate) struct MemSnapshot {
    content: Bytes,
}

impl MemSnapshot {
    pub(crate) fn new(content: Bytes) -> Self {
        MemSnapshot { content }
    }
}

#[async_trait]
impl Snapshot for MemSnapshot {
    fn size(&self) -> u64 {
        self.content.len() as u64
    }

    async fn read_all(&self) -> Result<Bytes, HandleError> {
        Ok(self.content.clone())
    }
}
