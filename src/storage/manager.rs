//! Storage Manager
//!
//! Manages multiple SSTables and coordinates reads/writes.
//!
//! ## Responsibilities
//! - Discover existing SSTables on startup
//! - Search SSTables newest → oldest for reads
//! - Create new SSTables from MemTable flushes
//! - Merge every SSTable into an ordered view (scans, compaction)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::{Result, SupplyError};
use crate::memtable::MemTable;

use super::{SSTable, SSTableBuilder, SSTableReader};

/// Key → latest version across SSTables (`None` = tombstone)
pub type MergedView = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// Manages the storage layer
///
/// ## Concurrency:
/// - `sstables`: Protected by RwLock (many concurrent readers, exclusive writer)
/// - `next_sstable_id`: Atomic counter (lock-free)
/// - All methods use `&self` (no exclusive access needed)
pub struct StorageManager {
    /// Directory where SSTables are stored
    data_dir: PathBuf,

    /// Open SSTable readers, ordered newest → oldest
    sstables: RwLock<Vec<SSTableReader>>,

    /// Next ID for creating new SSTables (atomic, lock-free)
    next_sstable_id: AtomicU64,
}

impl StorageManager {
    const TMP_SUFFIX: &'static str = "tmp";

    /// Open or create storage in the given directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Remove half-written tables left by a crash
    /// 3. Open readers for each SSTable (loads indexes into RAM)
    /// 4. Order by ID descending (newest first)
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;

        let mut sstable_ids: Vec<u64> = Vec::new();

        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if !file_path.is_file() {
                continue;
            }

            if file_path.extension().is_some_and(|ext| ext == Self::TMP_SUFFIX) {
                tracing::warn!(path = %file_path.display(), "removing incomplete SSTable");
                fs::remove_file(&file_path)?;
                continue;
            }

            if let Some(id) = Self::parse_sstable_id(&file_path) {
                sstable_ids.push(id);
            }
        }

        // Sort newest first (highest ID first)
        sstable_ids.sort_unstable_by(|a, b| b.cmp(a));

        let mut sstables = Vec::with_capacity(sstable_ids.len());
        for id in &sstable_ids {
            let sstable_path = Self::sstable_path_with_dir(path, *id);
            sstables.push(SSTableReader::open(&sstable_path)?);
        }

        // Next ID = max + 1, or 1 if no SSTables exist
        let next_id = sstable_ids.first().map(|&id| id + 1).unwrap_or(1);

        tracing::debug!(dir = %path.display(), sstables = sstables.len(), "storage opened");

        Ok(Self {
            data_dir: path.to_path_buf(),
            sstables: RwLock::new(sstables),
            next_sstable_id: AtomicU64::new(next_id),
        })
    }

    /// Get a value by key (searches all SSTables newest → oldest)
    ///
    /// Returns:
    /// - `Ok(Some(value))`: key found with value
    /// - `Ok(None)`: key not found, or found tombstone (deleted)
    ///
    /// Takes the write lock because `SSTableReader::get` seeks the file.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut sstables = self.sstables.write();

        for reader in sstables.iter_mut() {
            // Skip SSTable if key is outside its range (O(1) check)
            if !reader.might_contain(key) {
                continue;
            }

            match reader.get(key) {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => return Ok(None),                // Tombstone = deleted
                Err(SupplyError::KeyNotFound) => continue, // Not in this SSTable
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }

    /// Flush a MemTable to a new SSTable
    ///
    /// Creates a new SSTable file from the MemTable's sorted entries,
    /// opens a reader for it, and adds it to the front of the list.
    pub fn flush(&self, memtable: &MemTable) -> Result<SSTable> {
        if memtable.is_empty() {
            return Err(SupplyError::Storage(
                "Cannot flush empty MemTable".to_string(),
            ));
        }

        let entries = memtable
            .iter()
            .into_iter()
            .map(|(key, entry)| (key, entry.into_value()));
        let (metadata, reader) = self.write_sstable(entries)?;

        self.sstables.write().insert(0, reader);

        tracing::debug!(
            path = %metadata.path.display(),
            entries = metadata.entry_count,
            "memtable flushed"
        );
        Ok(metadata)
    }

    /// Merge every SSTable into one ordered view, newest version winning
    pub fn merged(&self) -> Result<MergedView> {
        let mut sstables = self.sstables.write();
        Self::merge_readers(&mut sstables)
    }

    /// Replace all SSTables with a single one holding only live values
    ///
    /// Returns the number of tables merged away. The new table is durable
    /// and carries the highest id before any old file is removed. Old files
    /// go oldest first: whatever survives a crash mid-way is a newer run of
    /// the old tables, so every tombstone still outranks the values it hid.
    pub fn compact(&self) -> Result<usize> {
        let mut sstables = self.sstables.write();
        if sstables.len() < 2 {
            return Ok(0);
        }

        let merged = Self::merge_readers(&mut sstables)?;
        let live: Vec<(Vec<u8>, Option<Vec<u8>>)> = merged
            .into_iter()
            .filter(|(_, value)| value.is_some())
            .collect();

        let replaced = sstables.len();
        let old_paths = Self::removal_order(&sstables);

        let new_tables = if live.is_empty() {
            Vec::new()
        } else {
            let (_, reader) = self.write_sstable(live.into_iter())?;
            vec![reader]
        };
        *sstables = new_tables;

        for path in old_paths {
            fs::remove_file(&path)?;
        }
        Self::sync_dir(&self.data_dir)?;

        tracing::info!(dir = %self.data_dir.display(), replaced, "SSTables compacted");
        Ok(replaced)
    }

    /// Get the number of SSTables
    pub fn sstable_count(&self) -> usize {
        self.sstables.read().len()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the next SSTable ID (for testing/debugging)
    pub fn next_sstable_id(&self) -> u64 {
        self.next_sstable_id.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write sorted entries to a fresh SSTable via a temp file + rename
    fn write_sstable<I>(&self, entries: I) -> Result<(SSTable, SSTableReader)>
    where
        I: Iterator<Item = (Vec<u8>, Option<Vec<u8>>)>,
    {
        let id = self.next_sstable_id.fetch_add(1, Ordering::SeqCst);
        let path = self.sstable_path(id);
        let tmp_path = path.with_extension(format!("sst.{}", Self::TMP_SUFFIX));

        let mut builder = SSTableBuilder::new(&tmp_path)?;
        for (key, value) in entries {
            builder.add_entry(&key, value.as_deref())?;
        }
        let mut metadata = builder.finish()?;

        fs::rename(&tmp_path, &path)?;
        Self::sync_dir(&self.data_dir)?;
        metadata.path = path.clone();

        let reader = SSTableReader::open(&path)?;
        Ok((metadata, reader))
    }

    /// Paths of `sstables` (held newest first), oldest first
    fn removal_order(sstables: &[SSTableReader]) -> Vec<PathBuf> {
        sstables
            .iter()
            .rev()
            .map(|r| r.path().to_path_buf())
            .collect()
    }

    /// Make renames and removals in `dir` durable
    #[cfg(unix)]
    fn sync_dir(dir: &Path) -> Result<()> {
        fs::File::open(dir)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_dir(_dir: &Path) -> Result<()> {
        Ok(())
    }

    fn merge_readers(sstables: &mut [SSTableReader]) -> Result<MergedView> {
        let mut merged = MergedView::new();

        // Oldest first so newer tables overwrite
        for reader in sstables.iter_mut().rev() {
            for item in reader.iter()? {
                let (key, value) = item?;
                merged.insert(key, value);
            }
        }

        Ok(merged)
    }

    /// Generate the file path for an SSTable with given ID
    fn sstable_path(&self, id: u64) -> PathBuf {
        Self::sstable_path_with_dir(&self.data_dir, id)
    }

    /// Generate SSTable path given a directory and ID
    fn sstable_path_with_dir(dir: &Path, id: u64) -> PathBuf {
        dir.join(format!("sstable_{:06}.sst", id))
    }

    /// Parse SSTable ID from filename
    /// "sstable_000042.sst" → Some(42)
    fn parse_sstable_id(path: &Path) -> Option<u64> {
        if path.extension()? != "sst" {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy();
        let id_str = name.strip_prefix("sstable_")?;
        id_str.parse().ok()
    }
}
