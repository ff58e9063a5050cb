//! HTTP Server
//!
//! Binds the listen address and serves the router until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::{Result, SupplyError};
use crate::inventory::Inventory;

use super::build_router;

/// HTTP server for SupplyKV
pub struct Server {
    config: Config,
    inventory: Arc<Inventory>,
}

impl Server {
    /// Create a new server with the given config and inventory
    pub fn new(config: Config, inventory: Arc<Inventory>) -> Self {
        Self { config, inventory }
    }

    /// Serve until Ctrl+C
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        })
        .await
    }

    /// Serve until `shutdown` resolves, then flush both stores
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self.config.listen_addr.parse().map_err(|e| {
            SupplyError::Config(format!("invalid listen address {}: {}", self.config.listen_addr, e))
        })?;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("listening on http://{}", listener.local_addr()?);

        let router = build_router(Arc::clone(&self.inventory));
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        let inventory = Arc::clone(&self.inventory);
        tokio::task::spawn_blocking(move || inventory.flush())
            .await
            .map_err(|e| SupplyError::Storage(format!("flush task failed: {}", e)))??;

        tracing::info!("stores flushed");
        Ok(())
    }
}
