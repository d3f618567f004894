//! Offset Index
//!
//! In-memory map from key to the log offset of its latest record.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use parking_lot::RwLock;

use crate::error::{LedgerError, Result};
use crate::record::RecordScanner;

/// Key → offset of the most recent record for that key
///
/// ## Concurrency:
/// - `search` takes the shared lock
/// - `insert` takes the exclusive lock for the offset/cursor update only
/// - All methods use `&self`
pub struct OffsetIndex {
    inner: RwLock<IndexState>,
}

#[derive(Default)]
struct IndexState {
    /// Offset of each key's latest record
    table: HashMap<Vec<u8>, u64>,
    /// Log length covered by the index; offset of the next record
    cursor: u64,
}

impl OffsetIndex {
    /// Create an empty index (cursor at 0)
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(IndexState::default()),
        }
    }

    /// Look up the offset of the latest record for `key`
    pub fn search(&self, key: &[u8]) -> Option<u64> {
        self.inner.read().table.get(key).copied()
    }

    /// Record that a `record_size`-byte record for `key` was appended at the
    /// current cursor
    ///
    /// Returns the offset stored for `key` (the cursor before this insert).
    pub fn insert(&self, key: &[u8], record_size: u64) -> u64 {
        let mut guard = self.inner.write();
        let state = &mut *guard;
        let offset = state.cursor;

        match state.table.get_mut(key) {
            Some(existing) => *existing = offset,
            None => {
                state.table.insert(key.to_vec(), offset);
            }
        }
        state.cursor += record_size;

        offset
    }

    /// Log length as seen by the index
    pub fn cursor(&self) -> u64 {
        self.inner.read().cursor
    }

    /// Number of distinct keys (tombstoned keys included)
    pub fn len(&self) -> usize {
        self.inner.read().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().table.is_empty()
    }

    /// Build an index by replaying the whole log from offset 0
    ///
    /// The log is only read, so a read-only log can be replayed. Creates an
    /// empty log if none exists. Any scan error aborts the rebuild; a partial
    /// index is never returned.
    pub fn rebuild_from_log(path: &Path, max_record_size: usize) -> Result<Self> {
        let file = Self::open_for_replay(path).map_err(|source| LedgerError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;

        let index = Self::new();
        let mut scanner = RecordScanner::new(file, max_record_size);

        while let Some(item) = scanner.next_with_offset() {
            let (offset, record) = item.map_err(|e| {
                tracing::error!(
                    path = %path.display(),
                    offset = scanner.position(),
                    error = %e,
                    "Index rebuild aborted"
                );
                e
            })?;

            let stored = index.insert(record.key(), record.encoded_size() as u64);
            debug_assert_eq!(stored, offset);
        }

        Ok(index)
    }

    fn open_for_replay(path: &Path) -> std::io::Result<File> {
        match File::open(path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                OpenOptions::new().write(true).create(true).open(path)?;
                File::open(path)
            }
            result => result,
        }
    }
}

impl Default for OffsetIndex {
    fn default() -> Self {
        Self::new()
    }
}
