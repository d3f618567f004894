//! Tests for MemoryStore
//!
//! These tests verify:
//! - Basic get/write/delete operations
//! - Size limit enforcement
//! - Concurrent access through the Store trait

use std::sync::Arc;
use std::thread;

use ledgerkv::{LedgerError, MemoryStore, Store};

#[test]
fn test_write_get() {
    let store = MemoryStore::default();

    store.write(b"hello", b"world").unwrap();

    assert_eq!(store.get(b"hello").unwrap(), b"world".to_vec());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_get_missing() {
    let store = MemoryStore::default();

    let err = store.get(b"missing").unwrap_err();

    assert!(matches!(err, LedgerError::NotFound { .. }));
    assert!(err.is_not_found());
}

#[test]
fn test_overwrite_and_delete() {
    let store = MemoryStore::default();

    store.write(b"key", b"v1").unwrap();
    store.write(b"key", b"v2").unwrap();
    assert_eq!(store.get(b"key").unwrap(), b"v2".to_vec());

    store.delete(b"key").unwrap();
    assert!(store.get(b"key").unwrap_err().is_not_found());
    assert!(store.is_empty());
}

#[test]
fn test_delete_missing_is_ok() {
    let store = MemoryStore::default();

    store.delete(b"never_written").unwrap();
}

#[test]
fn test_size_limit() {
    let store = MemoryStore::new(8);

    store.write(b"key", b"12345").unwrap();
    let err = store.write(b"key", b"123456").unwrap_err();

    assert!(matches!(err, LedgerError::BadRequest(_)));
    assert_eq!(store.get(b"key").unwrap(), b"12345".to_vec());
}

#[test]
fn test_empty_key_rejected() {
    let store = MemoryStore::default();

    assert!(matches!(store.write(b"", b"v"), Err(LedgerError::BadRequest(_))));
}

#[test]
fn test_concurrent_writes_via_trait() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::default());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100 {
                    let key = format!("t{}_k{}", t, i);
                    store.write(key.as_bytes(), key.as_bytes()).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for t in 0..4 {
        for i in 0..100 {
            let key = format!("t{}_k{}", t, i);
            assert_eq!(store.get(key.as_bytes()).unwrap(), key.into_bytes());
        }
    }

    store.close().unwrap();
}
