//! SupplyKV CLI
//!
//! Offline administration of a data directory. Must not run against a
//! directory a live server has open.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use supplykv::wal::WalRecovery;
use supplykv::{Config, Inventory};

/// SupplyKV CLI
#[derive(Parser, Debug)]
#[command(name = "supplykv-cli")]
#[command(about = "Offline tools for a SupplyKV data directory")]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./supplykv_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every supplier
    Suppliers,

    /// List every product
    Products,

    /// Show one supplier
    Supplier {
        /// Supplier id
        id: String,
    },

    /// Show one product with its supplier
    Product {
        /// Product id
        id: String,
    },

    /// List the products of one supplier
    BySupplier {
        /// Supplier id
        id: String,
    },

    /// List products whose supplier no longer exists
    Orphans,

    /// Merge each store's SSTables into one
    Compact,

    /// Check each store's WAL without modifying it
    VerifyWal,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> supplykv::Result<()> {
    if let Commands::VerifyWal = args.command {
        for store in ["suppliers", "products"] {
            verify_wal(store, &args.data_dir.join(store).join("wal.log"))?;
        }
        return Ok(());
    }

    let config = Config::builder().data_dir(&args.data_dir).build();
    let inventory = Inventory::open(&config)?;

    match args.command {
        Commands::Suppliers => print_json(&inventory.list_suppliers()?)?,
        Commands::Products => print_json(&inventory.list_products()?)?,
        Commands::Supplier { id } => print_json(&inventory.get_supplier(&id)?)?,
        Commands::Product { id } => print_json(&inventory.product_with_supplier(&id)?)?,
        Commands::BySupplier { id } => print_json(&inventory.products_by_supplier(&id)?)?,
        Commands::Orphans => print_json(&inventory.orphaned_products()?)?,
        Commands::Compact => {
            inventory.flush()?;
            let (suppliers, products) = inventory.compact()?;
            println!(
                "compacted suppliers: {} tables, products: {} tables",
                suppliers, products
            );
        }
        Commands::VerifyWal => {}
    }

    Ok(())
}

fn verify_wal(store: &str, path: &Path) -> supplykv::Result<()> {
    if !path.exists() {
        println!("{}: no WAL", store);
        return Ok(());
    }

    let result = WalRecovery::verify(path)?;
    println!(
        "{}: {} entries, {} corrupted, last lsn {}{}",
        store,
        result.entries_recovered,
        result.entries_corrupted,
        result.last_lsn,
        if result.was_truncated { ", torn tail" } else { "" }
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> supplykv::Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| supplykv::SupplyError::Serialization(e.to_string()))?;
    println!("{}", text);
    Ok(())
}
