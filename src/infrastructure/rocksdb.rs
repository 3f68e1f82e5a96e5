use crate::domain::ports::DurableStore;
use crate::error::{CartError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding one serialized cart per partition key.
pub const CF_CARTS: &str = "carts";

/// A persistent store implementation using RocksDB.
///
/// Keys are the partition key bytes and values the JSON text of the cart, so
/// entries survive process restarts the way browser local storage survives a
/// page reload.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "carts" column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_carts = ColumnFamilyDescriptor::new(CF_CARTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_carts])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn carts(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_CARTS).ok_or_else(|| {
            CartError::InternalError(Box::new(std::io::Error::other(
                "Carts column family not found",
            )))
        })
    }
}

#[async_trait]
impl DurableStore for RocksDBStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let cf = self.carts()?;

        match self.db.get_cf(&cf, key.as_bytes())? {
            Some(bytes) => {
                let value = String::from_utf8(bytes).map_err(|e| {
                    CartError::InternalError(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Stored cart is not UTF-8: {}", e),
                    )))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let cf = self.carts()?;
        self.db.put_cf(&cf, key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let cf = self.carts()?;
        self.db.delete_cf(&cf, key.as_bytes())?;
        Ok(())
    }
}
