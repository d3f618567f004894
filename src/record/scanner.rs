//! Record Scanner
//!
//! Lazily decodes records from any byte stream.
//!
//! Scanning is split in two: [`split`] looks at whatever bytes are buffered
//! and decides what to do next, and [`RecordScanner`] owns the buffer and the
//! refill policy. `split` never reads, so it can be driven by any source.

use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};

use crate::error::{LedgerError, Result};

use super::codec::{declared_size, Record, HEADER_SIZE};

/// Bytes requested from the reader per refill
const READ_CHUNK: usize = 8 * 1024;

/// Outcome of one scanning step over a buffer
#[derive(Debug, PartialEq, Eq)]
pub enum ScanStep {
    /// A full record was decoded from the front of the buffer
    Emit { record: Record, consumed: usize },

    /// The buffer holds less than one record; nothing was consumed
    NeedMoreData,

    /// The stream ended on a record boundary
    Finished,
}

/// Decide the next scanning step for the bytes currently buffered
///
/// `at_eof` says that no more bytes will arrive. `max_record_size` is the
/// logical (key + value) ceiling; a header announcing more than that plus
/// the fixed header fails with `RecordTooLarge`.
pub fn split(buf: &[u8], at_eof: bool, max_record_size: usize) -> Result<ScanStep> {
    if at_eof && buf.is_empty() {
        return Ok(ScanStep::Finished);
    }

    let ceiling = max_record_size.saturating_add(HEADER_SIZE);
    if let Some(size) = declared_size(buf) {
        if size > ceiling {
            return Err(LedgerError::RecordTooLarge { max: ceiling, size });
        }
    }

    match Record::decode(buf) {
        Ok(record) => {
            let consumed = record.encoded_size();
            Ok(ScanStep::Emit { record, consumed })
        }
        Err(LedgerError::InsufficientData { needed, available }) => {
            if at_eof {
                Err(LedgerError::Deserialize(format!(
                    "truncated record at end of stream: need {} bytes, have {}",
                    needed, available
                )))
            } else {
                Ok(ScanStep::NeedMoreData)
            }
        }
        Err(e) => Err(e),
    }
}

/// Forward-only iterator over the records of a byte stream
///
/// Yields `Err` at most once; after an error or the end of the stream it
/// only yields `None`.
pub struct RecordScanner<R> {
    /// Underlying byte stream
    reader: R,
    /// Bytes read but not yet consumed
    buf: BytesMut,
    /// Logical ceiling for a single record (key + value)
    max_record_size: usize,
    /// Stream offset of the first byte in `buf`
    position: u64,
    /// Reader returned 0 bytes
    eof: bool,
    /// No further items will be produced
    done: bool,
}

impl<R: Read> RecordScanner<R> {
    /// Create a scanner over `reader`
    pub fn new(reader: R, max_record_size: usize) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(READ_CHUNK),
            max_record_size,
            position: 0,
            eof: false,
            done: false,
        }
    }

    /// Report positions relative to `offset` (for a reader already seeked)
    pub fn starting_at(mut self, offset: u64) -> Self {
        self.position = offset;
        self
    }

    /// Stream offset of the next record to be decoded
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Decode the next record together with the offset it started at
    pub fn next_with_offset(&mut self) -> Option<Result<(u64, Record)>> {
        let offset = self.position;
        self.next().map(|item| item.map(|record| (offset, record)))
    }

    /// Read another chunk into the buffer, noting end of stream
    fn fill(&mut self) -> Result<()> {
        let start = self.buf.len();
        self.buf.resize(start + READ_CHUNK, 0);

        loop {
            match self.reader.read(&mut self.buf[start..]) {
                Ok(n) => {
                    self.buf.truncate(start + n);
                    if n == 0 {
                        self.eof = true;
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(LedgerError::Scan(e));
                }
            }
        }
    }
}

impl<R: Read> Iterator for RecordScanner<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match split(&self.buf, self.eof, self.max_record_size) {
                Ok(ScanStep::Emit { record, consumed }) => {
                    self.buf.advance(consumed);
                    self.position += consumed as u64;
                    return Some(Ok(record));
                }
                Ok(ScanStep::NeedMoreData) => {
                    if let Err(e) = self.fill() {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
                Ok(ScanStep::Finished) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for RecordScanner<R> {}
