//! Configuration for LedgerKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{LedgerError, Result};
use crate::record::HEADER_SIZE;

/// Default ceiling on the logical key + value size (1 MiB)
pub const DEFAULT_MAX_RECORD_SIZE: usize = 1024 * 1024;

/// Main configuration for a LedgerKV store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the append-only log file. The parent directory is created on
    /// open; the file itself is created on first use.
    pub storage_path: PathBuf,

    /// Maximum logical record size (key + value, in bytes).
    ///
    /// The physical ceiling for an encoded record is this value plus the
    /// fixed header, and the scanner sizes its buffer against that ceiling.
    pub max_record_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("./ledgerkv_data/ledger.log"),
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Largest encoded record the store will append or the scanner accept
    pub fn max_encoded_size(&self) -> usize {
        self.max_record_size.saturating_add(HEADER_SIZE)
    }

    /// Check that the configured limits are usable
    pub fn validate(&self) -> Result<()> {
        if self.max_record_size == 0 {
            return Err(LedgerError::Config(
                "max_record_size must be greater than zero".to_string(),
            ));
        }

        // Key and value lengths are stored as u32
        let limit = u32::MAX as usize - HEADER_SIZE;
        if self.max_record_size > limit {
            return Err(LedgerError::Config(format!(
                "max_record_size {} exceeds the format limit of {} bytes",
                self.max_record_size, limit
            )));
        }

        if self.storage_path.as_os_str().is_empty() {
            return Err(LedgerError::Config(
                "storage_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the log file path
    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_path = path.into();
        self
    }

    /// Set the maximum logical record size (in bytes)
    pub fn max_record_size(mut self, size: usize) -> Self {
        self.config.max_record_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
