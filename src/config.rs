//! Runtime settings for the `cart-engine` binary.
//!
//! Every flag can also come from the environment:
//! - `CART_DB_PATH` - RocksDB directory for persistent carts
//! - `CART_LOG_LEVEL` - bare level (`debug`) or directive string (`info,cart_engine=trace`)
//! - `CART_LOG_JSON` - emit JSON log lines instead of the compact format

use crate::domain::ports::DurableStoreBox;
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryStore;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "CART_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Log level or tracing directive string.
    #[arg(long, env = "CART_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON.
    #[arg(long, env = "CART_LOG_JSON")]
    pub log_json: bool,
}

impl Settings {
    /// Builds the durable store the settings ask for.
    ///
    /// Without the `storage-rocksdb` feature a requested `db_path` falls back to
    /// the in-memory store with a warning.
    pub fn open_store(&self) -> Result<DurableStoreBox> {
        match &self.db_path {
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => {
                info!(path = %path.display(), "Using RocksDB cart store");
                let store = crate::infrastructure::rocksdb::RocksDBStore::open(path)?;
                Ok(Box::new(store))
            }
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(_) => {
                // Printed directly so the log filter cannot hide it.
                eprintln!(
                    "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
                );
                Ok(Box::new(InMemoryStore::new()))
            }
            None => {
                info!("Using in-memory cart store");
                Ok(Box::new(InMemoryStore::new()))
            }
        }
    }
}
