use super::identity::Identity;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Key/value persistence for serialized carts, one entry per partition key.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Reports who, if anyone, is signed in.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<Identity>;
}

pub type DurableStoreBox = Box<dyn DurableStore>;
pub type IdentityProviderRef = Arc<dyn IdentityProvider>;
