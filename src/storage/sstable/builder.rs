//! SSTable Builder
//!
//! Streams strictly increasing keys into a new table file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SupplyError};

use super::{SSTable, HEADER_SIZE, MAGIC, TOMBSTONE_MARKER, VERSION};

/// Byte offset of the entry count inside the header
const COUNT_OFFSET: u64 = 6;

/// Writes one SSTable; consumed by `finish`
pub struct SSTableBuilder {
    path: PathBuf,
    out: BufWriter<File>,
    /// `(key, offset)` for every entry, in write order
    index: Vec<(Vec<u8>, u64)>,
    /// Offset the next entry will be written at
    offset: u64,
    data_crc: crc32fast::Hasher,
}

impl SSTableBuilder {
    /// Create the file and write a header with a zero count
    pub fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut out = BufWriter::new(file);
        out.write_all(MAGIC)?;
        out.write_all(&VERSION.to_le_bytes())?;
        out.write_all(&0u64.to_le_bytes())?;

        Ok(Self {
            path: path.to_path_buf(),
            out,
            index: Vec::new(),
            offset: HEADER_SIZE,
            data_crc: crc32fast::Hasher::new(),
        })
    }

    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.add_entry(key, Some(value))
    }

    pub fn add_tombstone(&mut self, key: &[u8]) -> Result<()> {
        self.add_entry(key, None)
    }

    /// Append one entry; `None` writes a tombstone
    ///
    /// Keys must be strictly increasing.
    pub fn add_entry(&mut self, key: &[u8], value: Option<&[u8]>) -> Result<()> {
        if let Some((last, _)) = self.index.last() {
            if key <= last.as_slice() {
                return Err(SupplyError::Storage(format!(
                    "SSTable keys out of order: {:?} after {:?}",
                    key, last
                )));
            }
        }

        let encoded = encode_entry(key, value);
        self.out.write_all(&encoded)?;
        self.data_crc.update(&encoded);

        self.index.push((key.to_vec(), self.offset));
        self.offset += encoded.len() as u64;
        Ok(())
    }

    /// Write index and footer, patch the count, and fsync
    pub fn finish(self) -> Result<SSTable> {
        let Self {
            path,
            mut out,
            index,
            offset: index_offset,
            data_crc,
        } = self;

        for (key, offset) in &index {
            out.write_all(&(key.len() as u32).to_le_bytes())?;
            out.write_all(&offset.to_le_bytes())?;
            out.write_all(key)?;
        }

        out.write_all(&index_offset.to_le_bytes())?;
        out.write_all(&data_crc.finalize().to_le_bytes())?;
        out.write_all(&[0u8; 4])?;

        let mut file = out
            .into_inner()
            .map_err(|e| SupplyError::Storage(format!("Failed to flush SSTable: {}", e)))?;

        let entry_count = index.len() as u64;
        file.seek(SeekFrom::Start(COUNT_OFFSET))?;
        file.write_all(&entry_count.to_le_bytes())?;
        file.sync_all()?;

        let file_size = file.metadata()?.len();
        let min_key = index.first().map(|(k, _)| k.clone()).unwrap_or_default();
        let max_key = index.last().map(|(k, _)| k.clone()).unwrap_or_default();

        Ok(SSTable {
            path,
            entry_count,
            min_key,
            max_key,
            file_size,
        })
    }
}

/// `[key_len: u32][val_len: u32][key][value]`, tombstones without value bytes
fn encode_entry(key: &[u8], value: Option<&[u8]>) -> Vec<u8> {
    let value_len = value.map_or(0, <[u8]>::len);
    let mut buf = Vec::with_capacity(8 + key.len() + value_len);

    buf.extend_from_slice(&(key.len() as u32).to_le_bytes());
    let marker = match value {
        Some(v) => v.len() as u32,
        None => TOMBSTONE_MARKER,
    };
    buf.extend_from_slice(&marker.to_le_bytes());
    buf.extend_from_slice(key);
    if let Some(v) = value {
        buf.extend_from_slice(v);
    }
    buf
}
