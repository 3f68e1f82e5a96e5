#![allow(dead_code)]

use async_trait::async_trait;
use cart_engine::application::engine::CartEngine;
use cart_engine::domain::cart::Cart;
use cart_engine::domain::line_item::{ProductInput, Quantity};
use cart_engine::domain::ports::DurableStore;
use cart_engine::error::{CartError, Result};
use cart_engine::infrastructure::identity::SessionIdentity;
use cart_engine::infrastructure::in_memory::InMemoryStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn product(id: &str, price: Decimal) -> ProductInput {
    ProductInput::new(id, format!("Product {}", id), price).expect("valid product")
}

pub fn qty(n: u32) -> Option<Quantity> {
    Some(Quantity::new(n).expect("positive quantity"))
}

pub fn engine(store: &InMemoryStore, identity: &SessionIdentity) -> CartEngine {
    CartEngine::new(Box::new(store.clone()), Arc::new(identity.clone()))
}

/// Reads back what the engine persisted under `key`.
pub async fn stored_cart(store: &impl DurableStore, key: &str) -> Option<Cart> {
    let raw = store.get(key).await.expect("store read")?;
    Some(serde_json::from_str(&raw).expect("stored cart is valid JSON"))
}

/// `(product id, quantity)` pairs of a line item slice, in order.
pub fn quantities(items: &[cart_engine::domain::line_item::LineItem]) -> Vec<(String, u32)> {
    items
        .iter()
        .map(|item| (item.product_id.to_string(), item.quantity.get()))
        .collect()
}

/// In-memory store whose reads and writes can be switched to fail.
#[derive(Default, Clone)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn failure(what: &str) -> CartError {
        CartError::InternalError(Box::new(std::io::Error::other(format!("{} failed", what))))
    }
}

#[async_trait]
impl DurableStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::failure("read"));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::failure("write"));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::failure("delete"));
        }
        self.inner.delete(key).await
    }
}
