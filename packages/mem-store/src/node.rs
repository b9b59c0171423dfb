//! The in-memory storage graph: directory and file nodes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use originfs_handle_store::HandleError;

/// Lock a mutex, mapping poisoning to a backend fault.
pub(crate) fn lock<T>(m: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, HandleError> {
    m.lock()
        .map_err(|_| HandleError::message("mem-store lock poisoned"))
}

/// One directory node. Children are kept in a `BTreeMap`, so entry
/// iteration order is deterministic (lexicographic by name).
#[derive(Default)]
pub(crate) struct DirNode {
    pub(crate) entries: Mutex<BTreeMap<String, NodeEntry>>,
}

pub(crate) enum NodeEntry {
    Dir(Arc<DirNode>),
    File(Arc<FileNode>),
}

/// One file node. Content is the last committed byte sequence; `locked`
/// is the single-writer session lock.
#[derive(Default)]
pub(crate) struct FileNode {
    pub(crate) state: Mutex<FileState>,
}

#[derive(Default)]
pub(crate) struct FileState {
    pub(crate) content: Bytes,
    pub(crate) locked: bool,
}

/// Committed bytes and lock status of a whole subtree.
pub(crate) struct SubtreeScan {
    pub(crate) bytes: u64,
    pub(crate) any_locked: bool,
}

/// Walk an entry's subtree, totalling committed bytes and noting open
/// sessions. Parent locks are held while children are visited; the graph is
/// strictly hierarchical, so the lock order is acyclic.
pub(crate) fn scan_subtree(entry: &NodeEntry) -> Result<SubtreeScan, HandleError> {
    match entry {
        NodeEntry::File(file) => {
            let state = lock(&file.state)?;
            Ok(SubtreeScan {
                bytes: state.content.len() as u64,
                any_locked: state.locked,
            })
        }
        NodeEntry::Dir(dir) => {
            let mut total = SubtreeScan {
                bytes: 0,
                any_locked: false,
            };
            let entries = lock(&dir.entries)?;
            for child in entries.values() {
                let scan = scan_subtree(child)?;
                total.bytes += scan.bytes;
                total.any_locked |= scan.any_locked;
            }
            Ok(total)
        }
    }
}
