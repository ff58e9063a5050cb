//! SupplyKV Server Binary
//!
//! Starts the HTTP server for SupplyKV.

use std::sync::Arc;

use clap::Parser;
use supplykv::network::Server;
use supplykv::{Config, Inventory, ReferentialPolicy};
use tracing_subscriber::{fmt, EnvFilter};

/// SupplyKV Server
#[derive(Parser, Debug)]
#[command(name = "supplykv-server")]
#[command(about = "Supplier and product inventory service")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./supplykv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// MemTable size limit in MB before flush
    #[arg(short = 'm', long, default_value = "4")]
    memtable_mb: usize,

    /// SSTable count that triggers compaction (0 disables)
    #[arg(short, long, default_value = "8")]
    compaction_threshold: usize,

    /// Referential policy for product writes: advisory or enforced
    #[arg(short, long, default_value = "advisory")]
    policy: ReferentialPolicy,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,supplykv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("SupplyKV Server v{}", supplykv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .memtable_size_limit(args.memtable_mb * 1024 * 1024)
        .compaction_threshold(args.compaction_threshold)
        .referential_policy(args.policy)
        .build();

    let inventory = match Inventory::open(&config) {
        Ok(inv) => Arc::new(inv),
        Err(e) => {
            tracing::error!("Failed to open inventory: {}", e);
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let server = Server::new(config, inventory);
    if let Err(e) = runtime.block_on(server.run()) {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
