//! Configuration for SupplyKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a SupplyKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── suppliers/       (supplier store)
    ///     │   ├── wal.log
    ///     │   └── sstables/
    ///     └── products/        (product store)
    ///         ├── wal.log
    ///         └── sstables/
    ///
    /// A bare `Engine` opened on this config uses `data_dir` directly.
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Max size of memtable before flush (in bytes)
    pub memtable_size_limit: usize,

    // -------------------------------------------------------------------------
    // Compaction Configuration
    // -------------------------------------------------------------------------
    /// Merge all SSTables into one once this many exist (0 disables)
    pub compaction_threshold: usize,

    // -------------------------------------------------------------------------
    // Inventory Configuration
    // -------------------------------------------------------------------------
    /// Whether product writes must name an existing supplier
    pub referential_policy: ReferentialPolicy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: String,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

/// How product writes treat their `supplierId` foreign key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialPolicy {
    /// Any supplier id is accepted; orphans surface at read time
    #[default]
    Advisory,

    /// Create/update naming an unknown supplier is a bad request
    Enforced,
}

impl std::str::FromStr for ReferentialPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "advisory" => Ok(ReferentialPolicy::Advisory),
            "enforced" => Ok(ReferentialPolicy::Enforced),
            other => Err(format!("unknown referential policy: {other}")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./supplykv_data"),
            wal_sync_strategy: WalSyncStrategy::EveryNEntries { count: 100 },
            memtable_size_limit: 4 * 1024 * 1024, // 4 MB
            compaction_threshold: 8,
            referential_policy: ReferentialPolicy::Advisory,
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Same settings, rooted at a sub-directory of `data_dir`
    pub fn with_subdir(&self, name: &str) -> Config {
        let mut config = self.clone();
        config.data_dir = self.data_dir.join(name);
        config
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the memtable size limit (in bytes)
    pub fn memtable_size_limit(mut self, size: usize) -> Self {
        self.config.memtable_size_limit = size;
        self
    }

    /// Set the SSTable count that triggers compaction
    pub fn compaction_threshold(mut self, count: usize) -> Self {
        self.config.compaction_threshold = count;
        self
    }

    /// Set the referential policy for product writes
    pub fn referential_policy(mut self, policy: ReferentialPolicy) -> Self {
        self.config.referential_policy = policy;
        self
    }

    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
