//! # SupplyKV
//!
//! An inventory backend for suppliers and the products they supply,
//! built on a small log-structured storage engine:
//! - Write-Ahead Logging (WAL) for durability
//! - Crash recovery with partial write handling
//! - Single-writer/multi-reader concurrency model
//! - Typed ordered maps with order-preserving keys
//! - Generic entity repositories and a join layer
//! - HTTP surface over axum
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Server                            │
//! │                (axum router, handlers)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Inventory                               │
//! │        (supplier/product repositories, joins)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  one OrderedMap per entity
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                 │
//! │            (Single Writer / Multi Reader)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │          │  MemTable   │
//!   │  (Append)   │          │  (RwLock)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │   Storage   │
//!                           │  (SSTable)  │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod memtable;
pub mod storage;
pub mod engine;
pub mod map;

pub mod model;
pub mod repository;
pub mod inventory;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SupplyError};
pub use config::{Config, ReferentialPolicy};
pub use engine::Engine;
pub use map::OrderedMap;
pub use inventory::Inventory;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SupplyKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
