//! Error types for LedgerKV
//!
//! A closed taxonomy shared by the codec, scanner, index and stores.
//! Errors are returned verbatim to callers; nothing here is retried.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Unified error type for LedgerKV operations
#[derive(Debug, Error)]
pub enum LedgerError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Not found: no entry for key '{key}'")]
    NotFound { key: String },

    #[error("Index not found: no index for key '{key}'")]
    IndexNotFound { key: String },

    #[error("Index seek failed for key '{key}' at offset {offset}: {source}")]
    IndexSeek {
        key: String,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Record too large: max {max}, record {size}")]
    RecordTooLarge { max: usize, size: usize },

    // -------------------------------------------------------------------------
    // Record Decoding Errors
    // -------------------------------------------------------------------------
    #[error("Insufficient data: need {needed} bytes, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Data corruption: stored checksum {stored:#010x}, computed {computed:#010x}")]
    DataCorruption { stored: u32, computed: u32 },

    #[error("Failed to deserialize: {0}")]
    Deserialize(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to open file at {}: {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write record to {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to sync {}: {source}", path.display())]
    FileSync {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scanner error: {0}")]
    Scan(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Consistency Errors
    // -------------------------------------------------------------------------
    #[error("Index out of sync with log: cursor {cursor}, file length {file_len}")]
    IndexOutOfSync { cursor: u64, file_len: u64 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub(crate) fn not_found(key: &[u8]) -> Self {
        LedgerError::NotFound { key: display_key(key) }
    }

    pub(crate) fn index_not_found(key: &[u8]) -> Self {
        LedgerError::IndexNotFound { key: display_key(key) }
    }

    /// True for both kinds of miss: a key that was never written and a key
    /// whose latest record is a tombstone.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::NotFound { .. } | LedgerError::IndexNotFound { .. }
        )
    }

    /// True when the error points at damaged log contents rather than a
    /// caller mistake or an environment failure.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            LedgerError::DataCorruption { .. } | LedgerError::Deserialize(_)
        )
    }
}

/// Render a binary key for error messages
pub(crate) fn display_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}
