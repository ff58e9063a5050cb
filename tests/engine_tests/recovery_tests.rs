//! Tests for Engine crash recovery
//!
//! "Crash" here means dropping the engine without `close`, which leaves
//! acknowledged writes only in the WAL.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use supplykv::config::{Config, WalSyncStrategy};
use supplykv::engine::Engine;
use tempfile::TempDir;

fn open(dir: &Path) -> Engine {
    let config = Config::builder()
        .data_dir(dir)
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .build();
    Engine::open(config).unwrap()
}

#[test]
fn test_replay_after_crash() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = open(temp_dir.path());
        engine.put(b"key1", b"value1").unwrap();
        engine.put(b"key2", b"value2").unwrap();
        engine.delete(b"key1").unwrap();
        engine.put(b"key3", b"value3").unwrap();
        drop(engine);
    }

    let engine = open(temp_dir.path());
    let recovery = engine.recovery().unwrap();
    assert_eq!(recovery.entries_recovered, 4);
    assert_eq!(recovery.last_lsn, 4);
    assert!(!recovery.was_truncated);

    // Recovered entries are flushed before the WAL restarts
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.memtable_entry_count(), 0);
    assert_eq!(engine.get(b"key1").unwrap(), None);
    assert_eq!(engine.get(b"key2").unwrap(), Some(b"value2".to_vec()));
    assert_eq!(engine.get(b"key3").unwrap(), Some(b"value3".to_vec()));
}

#[test]
fn test_repeated_crashes_lose_nothing() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = open(temp_dir.path());
        engine.put(b"first", b"1").unwrap();
    }
    {
        let engine = open(temp_dir.path());
        assert_eq!(engine.get(b"first").unwrap(), Some(b"1".to_vec()));
        engine.put(b"second", b"2").unwrap();
    }
    {
        let engine = open(temp_dir.path());
        assert_eq!(engine.recovery().unwrap().entries_recovered, 1);
    }

    let engine = open(temp_dir.path());
    assert_eq!(engine.recovery().unwrap().entries_recovered, 0);
    assert_eq!(
        engine.scan().unwrap(),
        vec![
            (b"first".to_vec(), b"1".to_vec()),
            (b"second".to_vec(), b"2".to_vec()),
        ]
    );
}

#[test]
fn test_torn_tail_is_discarded() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = open(temp_dir.path());
        engine.put(b"kept", b"yes").unwrap();
    }

    let mut wal = OpenOptions::new()
        .append(true)
        .open(temp_dir.path().join("wal.log"))
        .unwrap();
    wal.write_all(&[0x02, 0x00, 0x00]).unwrap();
    wal.sync_all().unwrap();
    drop(wal);

    let engine = open(temp_dir.path());
    let recovery = engine.recovery().unwrap();
    assert_eq!(recovery.entries_recovered, 1);
    assert!(recovery.was_truncated);
    assert_eq!(engine.get(b"kept").unwrap(), Some(b"yes".to_vec()));
}

#[test]
fn test_close_flushes_memtable() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = open(temp_dir.path());
        engine.put(b"k", b"v").unwrap();
        engine.close().unwrap();
    }

    let engine = open(temp_dir.path());
    assert_eq!(engine.recovery().unwrap().entries_recovered, 0);
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.get(b"k").unwrap(), Some(b"v".to_vec()));
}

/// Compact with the oldest table's path held by a directory, so the run
/// stops at the first removal that reaches it, then reopen
fn compact_interrupted_at_oldest(dir: &Path) -> Engine {
    let sstables = dir.join("sstables");
    let oldest = sstables.join("sstable_000001.sst");
    let stash = dir.join("stash.sst");
    {
        let engine = open(dir);
        std::fs::rename(&oldest, &stash).unwrap();
        std::fs::create_dir(&oldest).unwrap();

        assert!(engine.compact().is_err());
        drop(engine);
    }
    std::fs::remove_dir(&oldest).unwrap();
    std::fs::rename(&stash, &oldest).unwrap();

    open(dir)
}

#[test]
fn test_interrupted_compaction_keeps_deletes() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = open(temp_dir.path());
        engine.put(b"keep", b"1").unwrap();
        engine.put(b"gone", b"v1").unwrap();
        engine.flush().unwrap();
        engine.delete(b"gone").unwrap();
        engine.flush().unwrap();
        assert_eq!(engine.sstable_count(), 2);
    }

    let engine = compact_interrupted_at_oldest(temp_dir.path());
    assert_eq!(engine.get(b"gone").unwrap(), None);
    assert_eq!(engine.get(b"keep").unwrap(), Some(b"1".to_vec()));
    assert_eq!(engine.scan().unwrap(), vec![(b"keep".to_vec(), b"1".to_vec())]);
}

#[test]
fn test_interrupted_compaction_of_deleted_keys() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = open(temp_dir.path());
        engine.put(b"gone", b"v1").unwrap();
        engine.flush().unwrap();
        engine.delete(b"gone").unwrap();
        engine.flush().unwrap();
    }

    let engine = compact_interrupted_at_oldest(temp_dir.path());
    assert_eq!(engine.get(b"gone").unwrap(), None);
    assert!(engine.scan().unwrap().is_empty());
}
