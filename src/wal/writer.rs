//! WAL Writer
//!
//! Handles appending entries to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::WalSyncStrategy;
use crate::error::{Result, SupplyError};
use super::{Operation, WalEntry};

/// Writes entries to the WAL file
///
/// Opening a writer starts a fresh log: callers replay any existing
/// log through `WalRecovery` first.
pub struct WalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    /// LSN assigned to the next appended entry
    next_lsn: u64,
    sync_strategy: WalSyncStrategy,
    /// Entries appended since the last fsync
    unsynced: usize,
}

impl WalWriter {
    /// Open or create a WAL file
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            next_lsn: 1,
            sync_strategy,
            unsynced: 0,
        })
    }

    /// Append an operation, returning the LSN it was assigned
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let lsn = self.next_lsn;
        let entry = WalEntry::new(lsn, operation);
        let bytes = entry.serialize()?;

        self.writer
            .write_all(&bytes)
            .map_err(|e| SupplyError::WalWrite(format!("append lsn {}: {}", lsn, e)))?;
        self.next_lsn += 1;
        self.unsynced += 1;

        let should_sync = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced >= count.max(1),
        };
        if should_sync {
            self.sync()?;
        } else {
            self.writer.flush()?;
        }

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Discard every entry (after they became durable elsewhere)
    pub fn truncate(&mut self) -> Result<()> {
        self.writer.flush()?;
        let file = self.writer.get_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.sync_all()?;

        self.next_lsn = 1;
        self.unsynced = 0;
        tracing::debug!(path = %self.path.display(), "WAL truncated");
        Ok(())
    }

    /// Get the LSN the next append will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Entries written but not yet fsynced
    pub fn unsynced_entries(&self) -> usize {
        self.unsynced
    }
}
