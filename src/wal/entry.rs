//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their
//! on-disk framing: `[LSN: u64][CRC: u32][Len: u32][Data]`, little-endian,
//! where Data is the bincode encoding of the whole entry.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SupplyError};

/// Frame header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to perform
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },
}

impl WalEntry {
    /// Create an entry stamped with the current wall-clock time
    pub fn new(lsn: u64, operation: Operation) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            lsn,
            operation,
            timestamp,
        }
    }

    /// Encode into a self-describing frame
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(self)?;
        let crc = crc32fast::hash(&data);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
        bytes.extend_from_slice(&self.lsn.to_le_bytes());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&data);
        Ok(bytes)
    }

    /// Decode a frame, verifying the checksum and the header LSN
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let (lsn, crc, len) = Self::parse_header(bytes)?;

        if bytes.len() < HEADER_SIZE + len {
            return Err(SupplyError::WalCorruption(format!(
                "truncated entry: expected {} data bytes, got {}",
                len,
                bytes.len() - HEADER_SIZE
            )));
        }

        let data = &bytes[HEADER_SIZE..HEADER_SIZE + len];
        let actual = crc32fast::hash(data);
        if actual != crc {
            return Err(SupplyError::WalCorruption(format!(
                "CRC mismatch at lsn {}: stored {:08x}, computed {:08x}",
                lsn, crc, actual
            )));
        }

        let entry: WalEntry = bincode::deserialize(data)
            .map_err(|e| SupplyError::WalCorruption(format!("undecodable entry: {}", e)))?;

        if entry.lsn != lsn {
            return Err(SupplyError::WalCorruption(format!(
                "LSN mismatch: header {}, body {}",
                lsn, entry.lsn
            )));
        }

        Ok(entry)
    }

    /// Read `(lsn, crc, data_len)` from the front of a frame
    pub(crate) fn parse_header(bytes: &[u8]) -> Result<(u64, u32, usize)> {
        if bytes.len() < HEADER_SIZE {
            return Err(SupplyError::WalCorruption(format!(
                "incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut lsn = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        lsn.copy_from_slice(&bytes[0..8]);
        crc.copy_from_slice(&bytes[8..12]);
        len.copy_from_slice(&bytes[12..16]);

        Ok((
            u64::from_le_bytes(lsn),
            u32::from_le_bytes(crc),
            u32::from_le_bytes(len) as usize,
        ))
    }

    /// Size of the encoded frame
    pub fn serialized_size(&self) -> Result<usize> {
        Ok(HEADER_SIZE + bincode::serialized_size(self)? as usize)
    }

    /// Checksum of the encoded body
    pub fn compute_crc(&self) -> Result<u32> {
        let data = bincode::serialize(self)?;
        Ok(crc32fast::hash(&data))
    }

    /// The key this entry mutates
    pub fn key(&self) -> &[u8] {
        match &self.operation {
            Operation::Put { key, .. } | Operation::Delete { key } => key,
        }
    }
}
