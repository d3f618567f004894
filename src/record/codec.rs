//! Record codec
//!
//! Encoding and decoding of a single log record.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{LedgerError, Result};

/// Fixed header: checksum (4) + kind (1) + key length (4) + value length (4)
pub const HEADER_SIZE: usize = 13;

const CHECKSUM_LEN: usize = 4;

/// What a record means for its key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordKind {
    /// A live value
    Value = 0,

    /// A deletion marker
    Tombstone = 1,
}

impl TryFrom<u8> for RecordKind {
    type Error = LedgerError;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(RecordKind::Value),
            1 => Ok(RecordKind::Tombstone),
            other => Err(LedgerError::Deserialize(format!(
                "unknown record kind: 0x{:02x}",
                other
            ))),
        }
    }
}

/// A single record in the log
///
/// Built once by the write or delete path, appended once, never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: RecordKind,
    key: Vec<u8>,
    value: Vec<u8>,
}

impl Record {
    /// Create a value record
    pub fn new_value(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: RecordKind::Value,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a tombstone record (empty value)
    pub fn new_tombstone(key: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: RecordKind::Tombstone,
            key: key.into(),
            value: Vec::new(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Consume the record and return its value
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    pub fn is_tombstone(&self) -> bool {
        self.kind == RecordKind::Tombstone
    }

    /// Total number of bytes this record occupies in the log
    pub fn encoded_size(&self) -> usize {
        HEADER_SIZE + self.key.len() + self.value.len()
    }

    /// Encode to the on-disk layout
    ///
    /// Fails with `RecordTooLarge` if the key or value length does not fit
    /// the 32-bit length fields.
    pub fn encode(&self) -> Result<Bytes> {
        let key_len = u32::try_from(self.key.len()).map_err(|_| LedgerError::RecordTooLarge {
            max: u32::MAX as usize,
            size: self.key.len(),
        })?;
        let value_len =
            u32::try_from(self.value.len()).map_err(|_| LedgerError::RecordTooLarge {
                max: u32::MAX as usize,
                size: self.value.len(),
            })?;

        let mut buf = BytesMut::with_capacity(self.encoded_size());
        buf.put_u32(0); // Checksum placeholder
        buf.put_u8(self.kind as u8);
        buf.put_u32(key_len);
        buf.put_u32(value_len);
        buf.put_slice(&self.key);
        buf.put_slice(&self.value);

        let checksum = crc32fast::hash(&buf[CHECKSUM_LEN..]);
        buf[..CHECKSUM_LEN].copy_from_slice(&checksum.to_be_bytes());

        Ok(buf.freeze())
    }

    /// Decode one record from the front of `bytes`
    ///
    /// Bytes past the end of the record are ignored. The returned record owns
    /// copies of its key and value, so the input buffer can be reused.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let total = declared_size(bytes).ok_or(LedgerError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        })?;

        if bytes.len() < total {
            return Err(LedgerError::InsufficientData {
                needed: total,
                available: bytes.len(),
            });
        }

        let mut header = &bytes[..HEADER_SIZE];
        let stored = header.get_u32();
        let kind_byte = header.get_u8();
        let key_len = header.get_u32() as usize;

        let computed = crc32fast::hash(&bytes[CHECKSUM_LEN..total]);
        if computed != stored {
            return Err(LedgerError::DataCorruption { stored, computed });
        }

        let kind = RecordKind::try_from(kind_byte)?;
        let key_end = HEADER_SIZE + key_len;

        Ok(Self {
            kind,
            key: bytes[HEADER_SIZE..key_end].to_vec(),
            value: bytes[key_end..total].to_vec(),
        })
    }
}

/// Total encoded size announced by the header at the front of `bytes`
///
/// Returns `None` while fewer than `HEADER_SIZE` bytes are available.
pub fn declared_size(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < HEADER_SIZE {
        return None;
    }

    let mut lengths = &bytes[CHECKSUM_LEN + 1..HEADER_SIZE];
    let key_len = lengths.get_u32() as usize;
    let value_len = lengths.get_u32() as usize;

    Some(
        HEADER_SIZE
            .saturating_add(key_len)
            .saturating_add(value_len),
    )
}
