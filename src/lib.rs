//! # LedgerKV
//!
//! A minimal log-structured key-value store with:
//! - A single append-only log file; nothing is overwritten in place
//! - CRC32-checked records, with deletes written as tombstones
//! - An in-memory offset index rebuilt from the log on open
//! - Serialized, fsynced appends and lock-free file reads
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Store trait                           │
//! │              get / write / delete / close                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      LedgerStore                             │
//! │        (serialized appends / concurrent reads)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Log File   │◀─replay──│ OffsetIndex │
//!   │  (Append)   │          │  (RwLock)   │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │   Record    │
//!   │  Scanner    │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LedgerError, Result};
pub use config::Config;
pub use record::{Record, RecordKind, RecordScanner};
pub use store::{LedgerStore, MemoryStore, OffsetIndex, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LedgerKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
