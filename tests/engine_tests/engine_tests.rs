//! Tests for Engine
//!
//! These tests verify:
//! - get/put/delete with previous-value results
//! - Atomic read-modify-write through `update`
//! - Ordered scans across memtable and SSTables
//! - Flush and compaction triggers
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use supplykv::config::{Config, WalSyncStrategy};
use supplykv::engine::Engine;
use supplykv::SupplyError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn engine_with(memtable_limit: usize, compaction_threshold: usize) -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .memtable_size_limit(memtable_limit)
        .compaction_threshold(compaction_threshold)
        .build();
    let engine = Engine::open(config).unwrap();
    (temp_dir, engine)
}

fn temp_engine() -> (TempDir, Engine) {
    engine_with(1024 * 1024, 0)
}

fn keys(engine: &Engine) -> Vec<String> {
    engine
        .scan()
        .unwrap()
        .into_iter()
        .map(|(k, _)| String::from_utf8(k).unwrap())
        .collect()
}

// =============================================================================
// Point Operations
// =============================================================================

#[test]
fn test_open_creates_layout() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("suppliers");

    let engine = Engine::open_path(&data_dir).unwrap();

    assert!(data_dir.join("sstables").is_dir());
    assert!(data_dir.join("wal.log").is_file());
    assert_eq!(engine.data_dir(), data_dir.as_path());
    assert_eq!(engine.storage_dir(), data_dir.join("sstables").as_path());
    assert!(engine.recovery().is_none());
}

#[test]
fn test_put_returns_previous_value() {
    let (_dir, engine) = temp_engine();

    assert_eq!(engine.put(b"s1", b"Acme").unwrap(), None);
    assert_eq!(engine.put(b"s1", b"Globex").unwrap(), Some(b"Acme".to_vec()));
    assert_eq!(engine.get(b"s1").unwrap(), Some(b"Globex".to_vec()));
}

#[test]
fn test_put_if_absent() {
    let (_dir, engine) = temp_engine();

    assert!(engine.put_if_absent(b"s1", b"Acme").unwrap());
    assert!(!engine.put_if_absent(b"s1", b"Globex").unwrap());
    assert_eq!(engine.get(b"s1").unwrap(), Some(b"Acme".to_vec()));

    // A deleted key is vacant again
    engine.delete(b"s1").unwrap();
    assert!(engine.put_if_absent(b"s1", b"Initech").unwrap());
    assert_eq!(engine.get(b"s1").unwrap(), Some(b"Initech".to_vec()));
}

#[test]
fn test_put_if_absent_single_winner() {
    let (_dir, engine) = temp_engine();
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..8u8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.put_if_absent(b"claimed", &[i]).unwrap())
        })
        .collect();

    let winners: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(winners.iter().filter(|&&won| won).count(), 1);
    assert!(engine.get(b"claimed").unwrap().is_some());
}

#[test]
fn test_delete_returns_removed_value() {
    let (_dir, engine) = temp_engine();
    engine.put(b"p1", b"widget").unwrap();

    assert_eq!(engine.delete(b"p1").unwrap(), Some(b"widget".to_vec()));
    assert_eq!(engine.get(b"p1").unwrap(), None);
    assert_eq!(engine.delete(b"p1").unwrap(), None);
}

#[test]
fn test_delete_absent_key_writes_nothing() {
    let (_dir, engine) = temp_engine();

    assert_eq!(engine.delete(b"ghost").unwrap(), None);
    assert_eq!(engine.memtable_entry_count(), 0);
    assert_eq!(engine.memtable_size(), 0);
}

#[test]
fn test_delete_reaches_flushed_value() {
    let (_dir, engine) = temp_engine();
    engine.put(b"k", b"on disk").unwrap();
    engine.flush().unwrap();
    assert_eq!(engine.memtable_entry_count(), 0);

    assert_eq!(engine.delete(b"k").unwrap(), Some(b"on disk".to_vec()));
    assert_eq!(engine.get(b"k").unwrap(), None);
}

#[test]
fn test_binary_and_empty_values() {
    let (_dir, engine) = temp_engine();
    let binary: Vec<u8> = (0..=255).collect();

    engine.put(&[0x00, 0xFF], &binary).unwrap();
    engine.put(b"empty", b"").unwrap();

    assert_eq!(engine.get(&[0x00, 0xFF]).unwrap(), Some(binary));
    assert_eq!(engine.get(b"empty").unwrap(), Some(Vec::new()));
}

// =============================================================================
// Update
// =============================================================================

#[test]
fn test_update_rewrites_existing() {
    let (_dir, engine) = temp_engine();
    engine.put(b"qty", b"5").unwrap();

    let next = engine
        .update(b"qty", |mut v| {
            v.push(b'0');
            Ok(v)
        })
        .unwrap();

    assert_eq!(next, Some(b"50".to_vec()));
    assert_eq!(engine.get(b"qty").unwrap(), Some(b"50".to_vec()));
}

#[test]
fn test_update_absent_key_is_none() {
    let (_dir, engine) = temp_engine();

    let result = engine.update(b"missing", |_| panic!("closure must not run"));
    assert_eq!(result.unwrap(), None);
    assert_eq!(engine.memtable_entry_count(), 0);
}

#[test]
fn test_update_error_leaves_value() {
    let (_dir, engine) = temp_engine();
    engine.put(b"k", b"keep").unwrap();

    let result = engine.update(b"k", |_| Err(SupplyError::BadRequest("nope".into())));

    assert!(matches!(result, Err(SupplyError::BadRequest(_))));
    assert_eq!(engine.get(b"k").unwrap(), Some(b"keep".to_vec()));
}

#[test]
fn test_concurrent_updates_are_atomic() {
    let (_dir, engine) = temp_engine();
    let engine = Arc::new(engine);
    engine.put(b"counter", &0u64.to_be_bytes()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..50 {
                    engine
                        .update(b"counter", |bytes| {
                            let mut buf = [0u8; 8];
                            buf.copy_from_slice(&bytes);
                            Ok((u64::from_be_bytes(buf) + 1).to_be_bytes().to_vec())
                        })
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        engine.get(b"counter").unwrap(),
        Some(400u64.to_be_bytes().to_vec())
    );
}

// =============================================================================
// Scan
// =============================================================================

#[test]
fn test_scan_merges_all_layers_in_order() {
    let (_dir, engine) = temp_engine();

    engine.put(b"c", b"1").unwrap();
    engine.put(b"a", b"1").unwrap();
    engine.flush().unwrap();

    engine.put(b"b", b"2").unwrap();
    engine.delete(b"c").unwrap();
    engine.flush().unwrap();

    engine.put(b"a", b"3").unwrap();
    engine.put(b"d", b"3").unwrap();

    let scanned = engine.scan().unwrap();
    assert_eq!(
        scanned,
        vec![
            (b"a".to_vec(), b"3".to_vec()),
            (b"b".to_vec(), b"2".to_vec()),
            (b"d".to_vec(), b"3".to_vec()),
        ]
    );
}

#[test]
fn test_scan_empty_engine() {
    let (_dir, engine) = temp_engine();
    assert!(engine.scan().unwrap().is_empty());
}

// =============================================================================
// Flush and Compaction
// =============================================================================

#[test]
fn test_manual_flush() {
    let (_dir, engine) = temp_engine();
    engine.put(b"k", b"v").unwrap();

    engine.flush().unwrap();
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.memtable_size(), 0);

    // Empty memtable: nothing to write
    engine.flush().unwrap();
    assert_eq!(engine.sstable_count(), 1);
}

#[test]
fn test_auto_flush_at_size_limit() {
    let (_dir, engine) = engine_with(64, 0);

    for i in 0..10 {
        engine.put(format!("key{:02}", i).as_bytes(), &[7u8; 20]).unwrap();
    }

    assert!(engine.sstable_count() >= 3);
    assert!(engine.memtable_size() < 64);
    assert_eq!(keys(&engine).len(), 10);
}

#[test]
fn test_auto_compaction_at_threshold() {
    let (_dir, engine) = engine_with(1024 * 1024, 3);

    for round in 0..3 {
        engine.put(b"shared", format!("v{}", round).as_bytes()).unwrap();
        engine.put(format!("only{}", round).as_bytes(), b"x").unwrap();
        engine.flush().unwrap();
    }

    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.get(b"shared").unwrap(), Some(b"v2".to_vec()));
    assert_eq!(keys(&engine), vec!["only0", "only1", "only2", "shared"]);
}

#[test]
fn test_manual_compaction() {
    let (_dir, engine) = temp_engine();
    for i in 0..4 {
        engine.put(format!("k{}", i).as_bytes(), b"v").unwrap();
        engine.flush().unwrap();
    }
    engine.delete(b"k0").unwrap();
    engine.flush().unwrap();

    assert_eq!(engine.compact().unwrap(), 5);
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(keys(&engine), vec!["k1", "k2", "k3"]);
}

#[test]
fn test_concurrent_readers_and_writer() {
    let (_dir, engine) = engine_with(512, 4);
    let engine = Arc::new(engine);
    for i in 0..50u32 {
        engine.put(&i.to_be_bytes(), b"seed").unwrap();
    }

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for i in 50..150u32 {
                engine.put(&i.to_be_bytes(), b"more").unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..50u32 {
                    assert_eq!(engine.get(&i.to_be_bytes()).unwrap(), Some(b"seed".to_vec()));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(engine.scan().unwrap().len(), 150);
}
