//! Engine Module
//!
//! The byte-level storage engine that backs every `OrderedMap`.
//!
//! ## Responsibilities
//! - Coordinate WAL, MemTable, and Storage
//! - Handle concurrent read/write access
//! - Trigger flushes when MemTable is full, compaction when tables pile up
//! - Manage crash recovery on startup
//! - Produce ordered snapshots of the live key space

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::config::Config;
use crate::error::{Result, SupplyError};
use crate::memtable::MemTable;
use crate::storage::StorageManager;
use crate::wal::{Operation, RecoveryResult, WalRecovery, WalWriter};

/// The storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (put/delete/update/flush/compact): Serialized by `write_lock`
///   - Only ONE write operation at a time
///   - Must acquire: write_lock → WAL → memtable → storage (write)
///   - Read-modify-write (`put` returning the previous value, `update`)
///     happens entirely under the lock, so it is atomic per key
///
/// - **Reads** (get): no write_lock needed
///   - MemTable uses internal RwLock (many concurrent readers)
///   - StorageManager takes its own lock for SSTable reads
///
/// - **Scans**: hold `write_lock` while merging so the snapshot never
///   observes a half-applied flush or compaction
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Directory for all SSTables
    storage_dir: PathBuf,

    /// Write-ahead log for durability (exclusive access needed)
    wal: Mutex<WalWriter>,

    /// In-memory table for recent writes (internal RwLock)
    memtable: MemTable,

    /// Persistent storage manager (internal RwLock on sstables vec)
    storage: StorageManager,

    /// Serializes write operations
    write_lock: Mutex<()>,

    /// What startup recovery found in the WAL, if there was one
    recovery: Option<RecoveryResult>,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";
    const SSTABLE_DIR: &'static str = "sstables";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Open/create data directory
    /// 2. Load existing SSTables
    /// 3. Recover from WAL if exists, flushing recovered entries
    /// 4. Start a fresh WAL
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let storage_dir = config.data_dir.join(Self::SSTABLE_DIR);
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let storage = StorageManager::open(&storage_dir)?;
        let memtable = MemTable::new();

        let recovery = if wal_path.exists() {
            let (entries, result) = WalRecovery::recover(&wal_path)?;

            if result.entries_recovered > 0 || result.entries_corrupted > 0 {
                tracing::info!(
                    dir = %config.data_dir.display(),
                    recovered = result.entries_recovered,
                    corrupted = result.entries_corrupted,
                    last_lsn = result.last_lsn,
                    "WAL recovery"
                );
            }

            for entry in entries {
                match entry.operation {
                    Operation::Put { key, value } => {
                        memtable.put(key, value);
                    }
                    Operation::Delete { key } => {
                        memtable.delete(key);
                    }
                }
            }

            // Recovered data must be durable in an SSTable before the WAL
            // is reset below
            if !memtable.is_empty() {
                tracing::info!(entries = memtable.entry_count(), "flushing recovered entries");
                storage.flush(&memtable)?;
                memtable.clear();
            }

            Some(result)
        } else {
            None
        };

        let wal = WalWriter::open(&wal_path, config.wal_sync_strategy)?;

        tracing::debug!(
            dir = %config.data_dir.display(),
            sstables = storage.sstable_count(),
            "engine opened"
        );

        Ok(Self {
            config,
            storage_dir,
            wal: Mutex::new(wal),
            memtable,
            storage,
            write_lock: Mutex::new(()),
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Get a value by key
    ///
    /// Search order:
    /// 1. MemTable (most recent writes)
    /// 2. SSTables (newest to oldest)
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(entry) = self.memtable.get(key) {
            return Ok(entry.into_value());
        }

        self.storage.get(key)
    }

    /// Put a key-value pair, returning the value it replaced
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        let _write_guard = self.lock_writes()?;

        let previous = self.get(key)?;
        self.apply(Operation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;

        Ok(previous)
    }

    /// Write `value` only if `key` holds nothing, returning whether it did
    pub fn put_if_absent(&self, key: &[u8], value: &[u8]) -> Result<bool> {
        let _write_guard = self.lock_writes()?;

        if self.get(key)?.is_some() {
            return Ok(false);
        }
        self.apply(Operation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;

        Ok(true)
    }

    /// Delete a key, returning the value it held
    ///
    /// Deleting an absent key is a no-op and writes nothing.
    pub fn delete(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let _write_guard = self.lock_writes()?;

        let previous = self.get(key)?;
        if previous.is_some() {
            self.apply(Operation::Delete { key: key.to_vec() })?;
        }

        Ok(previous)
    }

    /// Atomically rewrite an existing value
    ///
    /// `f` receives the current value and returns its replacement. Returns
    /// the new value, or `None` without writing if the key is absent. An
    /// error from `f` aborts the update and is passed through.
    pub fn update<F>(&self, key: &[u8], f: F) -> Result<Option<Vec<u8>>>
    where
        F: FnOnce(Vec<u8>) -> Result<Vec<u8>>,
    {
        let _write_guard = self.lock_writes()?;

        let current = match self.get(key)? {
            Some(value) => value,
            None => return Ok(None),
        };

        let next = f(current)?;
        self.apply(Operation::Put {
            key: key.to_vec(),
            value: next.clone(),
        })?;

        Ok(Some(next))
    }

    /// Ordered snapshot of every live key-value pair
    pub fn scan(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let _write_guard = self.lock_writes()?;

        let mut merged = self.storage.merged()?;
        for (key, entry) in self.memtable.iter() {
            merged.insert(key, entry.into_value());
        }

        Ok(merged
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect())
    }

    /// Flush memtable to disk (public API)
    ///
    /// Forces a flush regardless of memtable size
    pub fn flush(&self) -> Result<()> {
        let _write_guard = self.lock_writes()?;
        self.flush_internal()
    }

    /// Merge all SSTables into one, returning how many were replaced
    pub fn compact(&self) -> Result<usize> {
        let _write_guard = self.lock_writes()?;
        self.storage.compact()
    }

    /// Close the engine gracefully
    ///
    /// Flushes any pending data and syncs to disk
    pub fn close(self) -> Result<()> {
        if !self.memtable.is_empty() {
            self.flush()?;
        }

        self.lock_wal()?.sync()?;

        tracing::debug!(dir = %self.config.data_dir.display(), "engine closed");
        Ok(())
    }

    // =========================================================================
    // Write Path (called with write lock held)
    // =========================================================================

    /// Log an operation, apply it to the memtable, flush if full
    fn apply(&self, operation: Operation) -> Result<()> {
        let new_size = {
            let mut wal = self.lock_wal()?;
            wal.append(operation.clone())?;

            match operation {
                Operation::Put { key, value } => self.memtable.put(key, value),
                Operation::Delete { key } => self.memtable.delete(key),
            }
        };

        if new_size >= self.config.memtable_size_limit {
            self.flush_internal()?;
        }

        Ok(())
    }

    fn flush_internal(&self) -> Result<()> {
        if self.memtable.is_empty() {
            return Ok(());
        }

        self.storage.flush(&self.memtable)?;
        self.memtable.clear();

        // Entries are now durable in an SSTable
        self.lock_wal()?.truncate()?;

        let threshold = self.config.compaction_threshold;
        if threshold > 0 && self.storage.sstable_count() >= threshold {
            self.storage.compact()?;
        }

        Ok(())
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| SupplyError::LockPoisoned(format!("Write lock poisoned: {}", e)))
    }

    fn lock_wal(&self) -> Result<MutexGuard<'_, WalWriter>> {
        self.wal
            .lock()
            .map_err(|e| SupplyError::LockPoisoned(format!("WAL lock poisoned: {}", e)))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the storage directory path (where SSTables are stored)
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Get the current memtable size
    pub fn memtable_size(&self) -> usize {
        self.memtable.size()
    }

    /// Get the memtable entry count
    pub fn memtable_entry_count(&self) -> usize {
        self.memtable.entry_count()
    }

    /// Get the number of SSTables
    pub fn sstable_count(&self) -> usize {
        self.storage.sstable_count()
    }

    /// What WAL recovery found at open, if a WAL existed
    pub fn recovery(&self) -> Option<&RecoveryResult> {
        self.recovery.as_ref()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
