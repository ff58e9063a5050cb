//! Network Module
//!
//! HTTP server exposing the inventory.
//!
//! ## Architecture
//! - `axum` router over a shared `Arc<Inventory>`
//! - Store calls run on tokio's blocking pool
//! - Graceful shutdown flushes both stores

mod handlers;
mod router;
mod server;

pub use router::build_router;
pub use server::Server;

use std::sync::Arc;

use crate::inventory::Inventory;

/// State shared by every handler
pub type AppState = Arc<Inventory>;
