use super::engine::CartEngine;
use crate::domain::command::CartCommand;
use crate::domain::identity::{Identity, PartitionKey};
use crate::domain::order::OrderSummary;
use crate::domain::ports::{DurableStoreBox, IdentityProvider};
use crate::infrastructure::identity::SessionIdentity;
use std::sync::Arc;
use tracing::{debug, info};

/// A storefront session: the cart engine plus the identity it reads.
///
/// Drives the login flow around the engine. Signing in merges the anonymous
/// cart into the user's exactly once; signing out falls back to the anonymous
/// partition.
pub struct ShopSession {
    engine: CartEngine,
    identity: SessionIdentity,
}

impl ShopSession {
    pub fn new(store: DurableStoreBox) -> Self {
        Self::with_identity(store, SessionIdentity::new())
    }

    pub fn with_identity(store: DurableStoreBox, identity: SessionIdentity) -> Self {
        let engine = CartEngine::new(store, Arc::new(identity.clone()));
        Self { engine, identity }
    }

    /// Loads the cart for whoever is signed in at startup.
    pub async fn start(&mut self) {
        self.engine.sync_identity().await;
    }

    pub fn engine(&self) -> &CartEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut CartEngine {
        &mut self.engine
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.identity.current()
    }

    /// Applies one command. Returns the order summary for a successful checkout.
    pub async fn apply(&mut self, command: CartCommand) -> Option<OrderSummary> {
        match command {
            CartCommand::Add { product, quantity } => {
                self.engine.add_item(product, quantity).await;
            }
            CartCommand::Update {
                product_id,
                quantity,
            } => {
                self.engine.update_quantity(&product_id, quantity).await;
            }
            CartCommand::Remove { product_id } => {
                self.engine.remove_item(&product_id).await;
            }
            CartCommand::Clear => self.engine.clear().await,
            CartCommand::Open => self.engine.open_cart(),
            CartCommand::Close => self.engine.close_cart(),
            CartCommand::Login { user_id } => self.login(user_id).await,
            CartCommand::Logout => self.logout().await,
            CartCommand::Checkout => return self.engine.checkout().await,
        }
        None
    }

    async fn login(&mut self, user_id: String) {
        match self.identity.current() {
            Some(current) if current.id == user_id => {
                debug!(user = %user_id, "Already signed in");
                return;
            }
            Some(_) => self.logout().await,
            None => {}
        }

        self.identity.sign_in(Identity::new(user_id.clone()));
        info!(user = %user_id, "Signed in");
        self.engine
            .merge_anonymous_cart(PartitionKey::user(&user_id))
            .await;
    }

    async fn logout(&mut self) {
        if let Some(identity) = self.identity.current() {
            info!(user = %identity.id, "Signed out");
        }
        self.identity.sign_out();
        self.engine.sync_identity().await;
    }
}
