//! Store Module
//!
//! The storage capability and its implementations.
//!
//! ## Responsibilities
//! - `LedgerStore`: durable, append-only log with an in-memory offset index
//! - `MemoryStore`: map-backed, no durability (tests, ephemeral use)
//! - `OffsetIndex`: key → offset of the latest record, rebuildable from the log
//!
//! ## Key Lifecycle (as seen through the index)
//! ```text
//!   Absent ──write──▶ Present(v) ──write──▶ Present(v')
//!     │                   │
//!     └─────delete────────┴──────▶ Deleted ──write──▶ Present(v)
//! ```
//! Absent and Deleted both read as not-found. Deleted has a tombstone in the
//! log; Absent has no index entry at all.

mod index;
mod ledger;
mod memory;

pub use index::OffsetIndex;
pub use ledger::LedgerStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// Key-value storage capability shared by all stores
pub trait Store: Send + Sync {
    /// Get the value for `key`, or a not-found error
    fn get(&self, key: &[u8]) -> Result<Vec<u8>>;

    /// Set `key` to `value`
    fn write(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove `key`
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Release resources held by the store
    fn close(&self) -> Result<()>;
}
