//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{Result, SupplyError};
use super::entry::HEADER_SIZE;
use super::WalEntry;

/// Frames claiming more data than this are treated as corrupt
const MAX_ENTRY_SIZE: usize = 64 * 1024 * 1024;

/// Outcome of reading one frame
#[derive(Debug)]
pub(crate) enum Frame {
    /// A valid entry and its encoded length
    Entry(WalEntry, u64),
    /// Clean end of file on a frame boundary
    End,
    /// The file ends inside a frame (torn write)
    Partial,
    /// A complete frame that fails validation
    Corrupt(String),
}

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Byte offset of the next frame
    position: u64,
    /// Set once a torn or corrupt frame is seen
    done: bool,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            done: false,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns `Ok(None)` at end of file or at a torn tail write,
    /// and `Err(WalCorruption)` for a complete frame with a bad checksum.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        match self.next_frame()? {
            Frame::Entry(entry, _) => Ok(Some(entry)),
            Frame::End | Frame::Partial => Ok(None),
            Frame::Corrupt(reason) => Err(SupplyError::WalCorruption(reason)),
        }
    }

    /// Iterate over all valid entries
    pub fn entries(self) -> WalIterator {
        WalIterator { reader: self }
    }

    /// Offset just past the last frame read successfully
    pub fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn next_frame(&mut self) -> Result<Frame> {
        if self.done {
            return Ok(Frame::End);
        }

        let mut header = [0u8; HEADER_SIZE];
        let read = read_fully(&mut self.reader, &mut header)?;
        if read == 0 {
            return Ok(Frame::End);
        }
        if read < HEADER_SIZE {
            self.done = true;
            return Ok(Frame::Partial);
        }

        let (lsn, _, len) = WalEntry::parse_header(&header)?;
        if len > MAX_ENTRY_SIZE {
            self.done = true;
            return Ok(Frame::Corrupt(format!(
                "implausible length {} at lsn {}",
                len, lsn
            )));
        }
        let mut frame = vec![0u8; HEADER_SIZE + len];
        frame[..HEADER_SIZE].copy_from_slice(&header);
        let read = read_fully(&mut self.reader, &mut frame[HEADER_SIZE..])?;
        if read < len {
            self.done = true;
            return Ok(Frame::Partial);
        }

        match WalEntry::deserialize(&frame) {
            Ok(entry) => {
                let size = frame.len() as u64;
                self.position += size;
                Ok(Frame::Entry(entry, size))
            }
            Err(SupplyError::WalCorruption(reason)) => {
                self.done = true;
                Ok(Frame::Corrupt(reason))
            }
            Err(e) => Err(e),
        }
    }
}

/// Like `read_exact`, but reports how much was read before EOF
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Iterator over WAL entries
pub struct WalIterator {
    reader: WalReader,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_entry().transpose()
    }
}
