//! Storage Module
//!
//! Persistent storage layer using an SSTable format.
//!
//! ## Responsibilities
//! - Persist data to disk in sorted format
//! - Point lookups and ordered full scans
//! - Compaction of accumulated tables
//!
//! ## Directory Layout
//! ```text
//! sstables/
//!   sstable_000001.sst
//!   sstable_000002.sst      (newer tables win on conflict)
//!   sstable_000003.sst.tmp  (in-progress write, removed on open)
//! ```

mod sstable;
mod manager;

pub use sstable::{SSTable, SSTableBuilder, SSTableEntry, SSTableIterator, SSTableReader};
pub use manager::{MergedView, StorageManager};
