//! Memory Store
//!
//! HashMap-based store with a single RwLock. Nothing is persisted.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::config::DEFAULT_MAX_RECORD_SIZE;
use crate::error::{LedgerError, Result};

use super::Store;

/// Ephemeral store for tests and throwaway use
pub struct MemoryStore {
    /// Ceiling on key + value size
    max_record_size: usize,

    /// All live entries
    table: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new(max_record_size: usize) -> Self {
        Self {
            max_record_size,
            table: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECORD_SIZE)
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.table
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(key))
    }

    fn write(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(LedgerError::BadRequest("key must not be empty".to_string()));
        }

        let payload = key.len() + value.len();
        if payload > self.max_record_size {
            return Err(LedgerError::BadRequest(format!(
                "key + value is {} bytes, exceeding the maximum size of {} bytes",
                payload, self.max_record_size
            )));
        }

        self.table.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    /// Deleting a missing key is not an error
    fn delete(&self, key: &[u8]) -> Result<()> {
        self.table.write().remove(key);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        tracing::debug!(keys = self.len(), "Memory store closed; nothing to persist");
        Ok(())
    }
}
