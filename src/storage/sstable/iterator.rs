//! SSTable Iterator
//!
//! Walks the data block front to back, yielding entries in key order.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

use crate::error::Result;

use super::{read_u32, HEADER_SIZE, TOMBSTONE_MARKER};

/// `(key, value)` where a `None` value is a tombstone
pub type SSTableEntry = (Vec<u8>, Option<Vec<u8>>);

/// Sequential reader over one table's data block
///
/// Borrows the reader's file handle, so the table cannot serve point
/// lookups while an iterator is alive.
pub struct SSTableIterator<'a> {
    file: &'a mut BufReader<File>,
    /// Start of the index block
    end: u64,
    pos: u64,
}

impl<'a> SSTableIterator<'a> {
    pub(super) fn new(file: &'a mut BufReader<File>, end: u64) -> Result<Self> {
        file.seek(SeekFrom::Start(HEADER_SIZE))?;
        Ok(Self {
            file,
            end,
            pos: HEADER_SIZE,
        })
    }

    fn read_entry(&mut self) -> Result<SSTableEntry> {
        let mut lens = [0u8; 8];
        self.file.read_exact(&mut lens)?;
        let key_len = read_u32(&lens, 0) as usize;
        let marker = read_u32(&lens, 4);

        let mut key = vec![0u8; key_len];
        self.file.read_exact(&mut key)?;
        self.pos += (lens.len() + key_len) as u64;

        if marker == TOMBSTONE_MARKER {
            return Ok((key, None));
        }

        let mut value = vec![0u8; marker as usize];
        self.file.read_exact(&mut value)?;
        self.pos += value.len() as u64;
        Ok((key, Some(value)))
    }
}

impl Iterator for SSTableIterator<'_> {
    type Item = Result<SSTableEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None;
        }

        let entry = self.read_entry();
        if entry.is_err() {
            // Offsets are unreliable after a failed read
            self.pos = self.end;
        }
        Some(entry)
    }
}
