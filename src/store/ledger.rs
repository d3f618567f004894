//! Ledger Store
//!
//! The durable engine: an append-only log plus an in-memory offset index.
//!
//! ## Responsibilities
//! - Append encoded records and fsync before acknowledging
//! - Keep the index in step with what is durably in the log
//! - Serve point lookups by seeking to the indexed offset
//! - Rebuild the index from the log on open

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{display_key, LedgerError, Result};
use crate::record::{Record, RecordScanner};

use super::{OffsetIndex, Store};

/// Durable log-structured store
///
/// ## Concurrency Model
///
/// - **Appends** (write/delete): serialized by `write_lock`, held across
///   open → write → fsync → index update. Two appends never interleave bytes
///   and one append's fsync never races another's write.
/// - **Index**: its own RwLock, taken exclusively only after a successful
///   fsync.
/// - **Reads** (get): shared index lock for the lookup only. The file scan
///   needs no lock: the log is append-only and an indexed offset always points
///   at a fully synced record, so concurrent appends only add bytes after it.
///
/// Every append and every read opens its own file handle.
pub struct LedgerStore {
    /// Store configuration
    config: Config,

    /// Key → offset of latest record (internal RwLock)
    index: OffsetIndex,

    /// Serializes appends
    write_lock: Mutex<()>,
}

impl LedgerStore {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Validate config
    /// 2. Create the parent directory of the log
    /// 3. Rebuild the index by replaying the log
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| LedgerError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let index = OffsetIndex::rebuild_from_log(&config.storage_path, config.max_record_size)?;

        tracing::info!(
            path = %config.storage_path.display(),
            keys = index.len(),
            log_len = index.cursor(),
            "Ledger store opened"
        );

        Ok(Self {
            config,
            index,
            write_lock: Mutex::new(()),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified log file
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().storage_path(path.as_ref()).build();
        Self::open(config)
    }

    /// Get the value for a key
    ///
    /// Returns:
    /// - `Ok(value)` — latest record for the key is a value
    /// - `Err(IndexNotFound)` — key was never written
    /// - `Err(NotFound)` — latest record for the key is a tombstone
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let offset = self
            .index
            .search(key)
            .ok_or_else(|| LedgerError::index_not_found(key))?;

        let path = &self.config.storage_path;
        let mut file = File::open(path).map_err(|source| LedgerError::OpenFile {
            path: path.clone(),
            source,
        })?;

        file.seek(SeekFrom::Start(offset))
            .map_err(|source| LedgerError::IndexSeek {
                key: display_key(key),
                offset,
                source,
            })?;

        // The index always points at the key's latest record, so the first
        // match is the answer. Stopping there also keeps the scan clear of a
        // tail that a concurrent append may still be writing.
        let scanner = RecordScanner::new(file, self.config.max_record_size).starting_at(offset);
        for item in scanner {
            let record = item?;
            if record.key() != key {
                continue;
            }

            if record.is_tombstone() {
                return Err(LedgerError::not_found(key));
            }
            return Ok(record.into_value());
        }

        Err(LedgerError::not_found(key))
    }

    /// Set a key to a value
    ///
    /// The key must be non-empty and key + value must not exceed
    /// `max_record_size`. Returns once the record is synced to disk.
    pub fn write(&self, key: &[u8], value: &[u8]) -> Result<()> {
        Self::check_key(key)?;

        let payload = key.len() + value.len();
        if payload > self.config.max_record_size {
            return Err(LedgerError::BadRequest(format!(
                "key + value is {} bytes, exceeding the maximum size of {} bytes",
                payload, self.config.max_record_size
            )));
        }

        self.append(Record::new_value(key, value))
    }

    /// Delete a key by appending a tombstone
    ///
    /// Earlier records for the key stay in the log. Deleting a key that was
    /// never written still appends a tombstone.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        Self::check_key(key)?;
        self.append(Record::new_tombstone(key))
    }

    /// Close the store
    ///
    /// Every append is synced before it returns, so there is nothing to flush.
    pub fn close(&self) -> Result<()> {
        tracing::debug!(
            path = %self.config.storage_path.display(),
            log_len = self.index.cursor(),
            "Ledger store closed"
        );
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.config.storage_path
    }

    /// Number of keys in the index (tombstoned keys included)
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Log length covered by the index
    pub fn log_len(&self) -> u64 {
        self.index.cursor()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn check_key(key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(LedgerError::BadRequest("key must not be empty".to_string()));
        }
        Ok(())
    }

    /// Append one record, fsync, then index it
    ///
    /// On a failed write or sync the index is left untouched and the file is
    /// cut back to its previous length.
    fn append(&self, record: Record) -> Result<()> {
        let size = record.encoded_size();
        let max = self.config.max_encoded_size();
        if size > max {
            return Err(LedgerError::RecordTooLarge { max, size });
        }

        let bytes = record.encode()?;
        let path = &self.config.storage_path;

        let _write_guard = self.write_lock.lock();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LedgerError::OpenFile {
                path: path.clone(),
                source,
            })?;

        let file_len = file
            .metadata()
            .map_err(|source| LedgerError::OpenFile {
                path: path.clone(),
                source,
            })?
            .len();
        let cursor = self.index.cursor();
        if cursor != file_len {
            tracing::error!(
                path = %path.display(),
                cursor,
                file_len,
                "Index out of sync with log; refusing to append"
            );
            return Err(LedgerError::IndexOutOfSync { cursor, file_len });
        }

        if let Err(source) = file.write_all(&bytes) {
            Self::roll_back(&file, path, file_len);
            return Err(LedgerError::WriteFile {
                path: path.clone(),
                source,
            });
        }

        if let Err(source) = file.sync_all() {
            Self::roll_back(&file, path, file_len);
            return Err(LedgerError::FileSync {
                path: path.clone(),
                source,
            });
        }

        let offset = self.index.insert(record.key(), size as u64);

        tracing::debug!(
            key = %display_key(record.key()),
            offset,
            size,
            tombstone = record.is_tombstone(),
            "Record appended"
        );

        Ok(())
    }

    /// Cut the log back to `len` after a failed append
    fn roll_back(file: &File, path: &Path, len: u64) {
        match file.set_len(len).and_then(|_| file.sync_all()) {
            Ok(()) => tracing::warn!(
                path = %path.display(),
                len,
                "Rolled back failed append"
            ),
            Err(e) => tracing::error!(
                path = %path.display(),
                len,
                error = %e,
                "Failed to roll back append; log holds an unindexed tail"
            ),
        }
    }
}

impl Store for LedgerStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        LedgerStore::get(self, key)
    }

    fn write(&self, key: &[u8], value: &[u8]) -> Result<()> {
        LedgerStore::write(self, key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        LedgerStore::delete(self, key)
    }

    fn close(&self) -> Result<()> {
        LedgerStore::close(self)
    }
}
