//! Tests for OffsetIndex
//!
//! These tests verify:
//! - Insert records the pre-write cursor as the key's offset
//! - Rebuild from an empty, missing, or populated log
//! - Rebuild equivalence with an incrementally maintained index
//! - Rebuild aborts on corrupt or truncated logs
//! - Rebuild only needs read access to the log

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use ledgerkv::{LedgerError, OffsetIndex, Record};
use tempfile::TempDir;

const MAX: usize = 1024 * 1024;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ledger.log");
    (temp_dir, path)
}

/// Append records to the log while maintaining an index the way the store does
fn append_with_index(path: &Path, index: &OffsetIndex, records: &[Record]) {
    let mut file = OpenOptions::new().create(true).append(true).open(path).unwrap();
    for record in records {
        file.write_all(&record.encode().unwrap()).unwrap();
        index.insert(record.key(), record.encoded_size() as u64);
    }
    file.sync_all().unwrap();
}

fn workload() -> Vec<Record> {
    let mut records = Vec::new();
    for i in 0..50 {
        records.push(Record::new_value(
            format!("key{}", i % 10).into_bytes(),
            format!("value{}", i).into_bytes(),
        ));
        if i % 7 == 0 {
            records.push(Record::new_tombstone(format!("key{}", i % 10).into_bytes()));
        }
    }
    records
}

// =============================================================================
// Insert / Search Tests
// =============================================================================

#[test]
fn test_new_index_is_empty() {
    let index = OffsetIndex::new();

    assert!(index.is_empty());
    assert_eq!(index.len(), 0);
    assert_eq!(index.cursor(), 0);
    assert_eq!(index.search(b"missing"), None);
}

#[test]
fn test_insert_records_pre_write_cursor() {
    let index = OffsetIndex::new();

    assert_eq!(index.insert(b"a", 20), 0);
    assert_eq!(index.insert(b"b", 30), 20);
    assert_eq!(index.insert(b"c", 5), 50);

    assert_eq!(index.search(b"a"), Some(0));
    assert_eq!(index.search(b"b"), Some(20));
    assert_eq!(index.search(b"c"), Some(50));
    assert_eq!(index.cursor(), 55);
}

#[test]
fn test_insert_overwrites_offset() {
    let index = OffsetIndex::new();

    index.insert(b"key", 10);
    index.insert(b"other", 10);
    index.insert(b"key", 10);

    assert_eq!(index.search(b"key"), Some(20));
    assert_eq!(index.len(), 2);
    assert_eq!(index.cursor(), 30);
}

#[test]
fn test_concurrent_search_during_insert() {
    let index = Arc::new(OffsetIndex::new());
    index.insert(b"stable", 10);

    let writer = {
        let index = Arc::clone(&index);
        thread::spawn(move || {
            for i in 0..1000 {
                index.insert(format!("k{}", i).as_bytes(), 10);
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for _ in 0..1000 {
                    assert_eq!(index.search(b"stable"), Some(0));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(index.len(), 1001);
    assert_eq!(index.cursor(), 10_010);
}

// =============================================================================
// Rebuild Tests
// =============================================================================

#[test]
fn test_rebuild_creates_missing_log() {
    let (_temp, path) = setup_temp_log();
    assert!(!path.exists());

    let index = OffsetIndex::rebuild_from_log(&path, MAX).unwrap();

    assert!(path.exists());
    assert!(index.is_empty());
    assert_eq!(index.cursor(), 0);
}

#[test]
fn test_rebuild_empty_log() {
    let (_temp, path) = setup_temp_log();
    File::create(&path).unwrap();

    let index = OffsetIndex::rebuild_from_log(&path, MAX).unwrap();

    assert!(index.is_empty());
}

#[test]
fn test_rebuild_matches_incremental_index() {
    let (_temp, path) = setup_temp_log();
    let records = workload();

    let incremental = OffsetIndex::new();
    append_with_index(&path, &incremental, &records);

    let rebuilt = OffsetIndex::rebuild_from_log(&path, MAX).unwrap();

    assert_eq!(rebuilt.len(), incremental.len());
    assert_eq!(rebuilt.cursor(), incremental.cursor());
    for i in 0..10 {
        let key = format!("key{}", i);
        assert_eq!(
            rebuilt.search(key.as_bytes()),
            incremental.search(key.as_bytes()),
            "offset mismatch for {}",
            key
        );
    }
}

#[test]
fn test_rebuild_cursor_equals_file_length() {
    let (_temp, path) = setup_temp_log();
    append_with_index(&path, &OffsetIndex::new(), &workload());

    let index = OffsetIndex::rebuild_from_log(&path, MAX).unwrap();

    assert_eq!(index.cursor(), fs::metadata(&path).unwrap().len());
}

#[test]
fn test_rebuild_indexes_tombstones() {
    let (_temp, path) = setup_temp_log();
    let put = Record::new_value(b"key".to_vec(), b"value".to_vec());
    let del = Record::new_tombstone(b"key".to_vec());
    append_with_index(&path, &OffsetIndex::new(), &[put.clone(), del]);

    let index = OffsetIndex::rebuild_from_log(&path, MAX).unwrap();

    // Latest entry is the tombstone, right after the value
    assert_eq!(index.search(b"key"), Some(put.encoded_size() as u64));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_rebuild_fails_on_corruption() {
    let (_temp, path) = setup_temp_log();
    append_with_index(&path, &OffsetIndex::new(), &workload());

    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let result = OffsetIndex::rebuild_from_log(&path, MAX);

    assert!(matches!(result, Err(LedgerError::DataCorruption { .. })));
}

#[test]
fn test_rebuild_fails_on_truncated_tail() {
    let (_temp, path) = setup_temp_log();
    append_with_index(&path, &OffsetIndex::new(), &workload());

    let len = fs::metadata(&path).unwrap().len();
    OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_len(len - 2)
        .unwrap();

    let result = OffsetIndex::rebuild_from_log(&path, MAX);

    assert!(matches!(result, Err(LedgerError::Deserialize(_))));
}

#[test]
fn test_rebuild_fails_on_oversized_record() {
    let (_temp, path) = setup_temp_log();
    let big = Record::new_value(b"big".to_vec(), vec![0u8; 2048]);
    append_with_index(&path, &OffsetIndex::new(), &[big]);

    let result = OffsetIndex::rebuild_from_log(&path, 1024);

    assert!(matches!(result, Err(LedgerError::RecordTooLarge { .. })));
}

#[cfg(unix)]
#[test]
fn test_rebuild_read_only_log() {
    use std::os::unix::fs::PermissionsExt;

    let (_temp, path) = setup_temp_log();
    let records = workload();
    let incremental = OffsetIndex::new();
    append_with_index(&path, &incremental, &records);
    let len = fs::metadata(&path).unwrap().len();

    fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

    let rebuilt = OffsetIndex::rebuild_from_log(&path, MAX).unwrap();

    assert_eq!(rebuilt.cursor(), incremental.cursor());
    assert_eq!(rebuilt.len(), incremental.len());
    assert_eq!(fs::metadata(&path).unwrap().len(), len);

    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
}

#[test]
fn test_rebuild_reports_open_failure() {
    let (temp, _path) = setup_temp_log();
    let path = temp.path().join("missing_dir").join("ledger.log");

    let result = OffsetIndex::rebuild_from_log(&path, MAX);

    assert!(matches!(
        result,
        Err(LedgerError::OpenFile { path: ref p, .. }) if p == &path
    ));
}
