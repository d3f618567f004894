//! Record Module
//!
//! The unit of storage in the log, and the scanner that reads it back.
//!
//! ## Responsibilities
//! - Byte-exact record layout with a CRC32 checksum
//! - Decode with truncation and corruption detection
//! - Incremental scanning of a byte stream under partial input
//!
//! ## File Format
//! The log has no header or footer; it is records concatenated until EOF.
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Record 1                                                     │
//! │ ┌─────────┬──────────┬──────────┬──────────┬─────┬────────┐  │
//! │ │ CRC (4) │ Kind (1) │ KLen (4) │ VLen (4) │ Key │ Value  │  │
//! │ └─────────┴──────────┴──────────┴──────────┴─────┴────────┘  │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Record 2                                                     │
//! │ ...                                                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//! Integers are big-endian. The CRC (IEEE) covers every byte after the
//! checksum field: kind, both lengths, key and value.

mod codec;
mod scanner;

pub use codec::{declared_size, Record, RecordKind, HEADER_SIZE};
pub use scanner::{split, RecordScanner, ScanStep};
