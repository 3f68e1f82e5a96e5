use crate::domain::cart::Cart;
use crate::domain::events::CartEvent;
use crate::domain::identity::PartitionKey;
use crate::domain::line_item::{LineItem, ProductId, ProductInput, Quantity};
use crate::domain::order::{OrderSummary, generate_order_number};
use crate::domain::ports::{DurableStoreBox, IdentityProviderRef};
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

const EVENT_CAPACITY: usize = 64;

struct ActiveCart {
    key: PartitionKey,
    cart: Cart,
}

/// Owns the shopping cart of the current session.
///
/// `CartEngine` keeps one authoritative in-memory [`Cart`] for the active
/// partition key and writes it back to the durable store after every mutation.
/// Mutating methods take `&mut self`, so a mutation and its write complete
/// before the next one starts.
///
/// Persistence is best effort: store failures are logged and never surfaced.
/// A failed read yields an empty cart, a failed write leaves the in-memory
/// cart as the source of truth for the rest of the session.
pub struct CartEngine {
    store: DurableStoreBox,
    identity: IdentityProviderRef,
    active: Option<ActiveCart>,
    is_open: bool,
    events: broadcast::Sender<CartEvent>,
}

impl CartEngine {
    /// Creates a new `CartEngine` instance.
    ///
    /// Nothing is loaded until the first operation or an explicit
    /// [`CartEngine::sync_identity`] / [`CartEngine::load`].
    ///
    /// # Arguments
    ///
    /// * `store` - Where serialized carts are kept, one entry per partition key.
    /// * `identity` - Tells the engine which partition is active.
    pub fn new(store: DurableStoreBox, identity: IdentityProviderRef) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            identity,
            active: None,
            is_open: false,
            events,
        }
    }

    /// Subscribes to the events emitted after each state change.
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// The partition currently loaded, `None` before the first load.
    pub fn partition_key(&self) -> Option<&PartitionKey> {
        self.active.as_ref().map(|active| &active.key)
    }

    /// Read-only snapshot of the active cart's lines, in insertion order.
    pub fn items(&self) -> &[LineItem] {
        self.active
            .as_ref()
            .map(|active| active.cart.items())
            .unwrap_or_default()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn open_cart(&mut self) {
        self.is_open = true;
        self.emit(CartEvent::VisibilityChanged(true));
    }

    pub fn close_cart(&mut self) {
        self.is_open = false;
        self.emit(CartEvent::VisibilityChanged(false));
    }

    /// Re-derives the partition key from the identity provider and reloads
    /// when it differs from the active one.
    pub async fn sync_identity(&mut self) {
        self.ensure_loaded().await;
    }

    /// Loads the cart stored under `key` and makes it the active cart.
    ///
    /// A missing or unreadable entry yields an empty cart.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn load(&mut self, key: PartitionKey) {
        let cart = self.read_cart(&key).await;
        debug!(items = cart.items().len(), "Loaded cart");
        self.emit(CartEvent::Loaded {
            key: key.clone(),
            items: cart.items().len(),
        });
        self.active = Some(ActiveCart { key, cart });
    }

    /// Adds `quantity` units of `product` (one when `None`).
    ///
    /// A product already in the cart only has its quantity increased; the
    /// price and metadata captured on the first add are kept.
    pub async fn add_item(&mut self, product: ProductInput, quantity: Option<Quantity>) {
        let quantity = quantity.unwrap_or_default();
        let product_id = product.product_id.clone();

        self.ensure_loaded().await.cart.add(product, quantity);
        debug!(product = %product_id, quantity = quantity.get(), "Added item");

        self.persist().await;
        self.emit(CartEvent::ItemAdded {
            product_id,
            quantity: quantity.get(),
        });
        self.open_cart();
    }

    /// Sets the quantity of a line. `quantity <= 0` removes it; an unknown id
    /// is ignored.
    pub async fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        let changed = self
            .ensure_loaded()
            .await
            .cart
            .set_quantity(product_id, quantity);
        if !changed {
            debug!(product = %product_id, "Update ignored, product not in cart");
            return;
        }

        self.persist().await;
        let remaining = self
            .active
            .as_ref()
            .and_then(|active| active.cart.get(product_id))
            .map(|item| item.quantity.get());
        match remaining {
            Some(quantity) => self.emit(CartEvent::QuantityUpdated {
                product_id: product_id.clone(),
                quantity,
            }),
            None => self.emit(CartEvent::ItemRemoved {
                product_id: product_id.clone(),
            }),
        }
    }

    /// Removes the line for `product_id`, if there is one.
    pub async fn remove_item(&mut self, product_id: &ProductId) {
        if !self.ensure_loaded().await.cart.remove(product_id) {
            debug!(product = %product_id, "Remove ignored, product not in cart");
            return;
        }

        self.persist().await;
        self.emit(CartEvent::ItemRemoved {
            product_id: product_id.clone(),
        });
    }

    /// Empties the active cart and deletes its store entry.
    pub async fn clear(&mut self) {
        let active = self.ensure_loaded().await;
        active.cart.clear();
        let key = active.key.clone();

        if let Err(e) = self.store.delete(key.as_str()).await {
            warn!(key = %key, error = %e, "Failed to delete stored cart");
        }
        debug!(key = %key, "Cleared cart");
        self.emit(CartEvent::Cleared { key });
    }

    /// Sum of `price * quantity`, formatted with exactly two decimals.
    pub fn total_price(&self) -> String {
        self.active
            .as_ref()
            .map(|active| active.cart.total_price())
            .unwrap_or_else(|| Cart::new().total_price())
    }

    /// Exact, unrounded sum of `price * quantity`.
    pub fn subtotal(&self) -> Decimal {
        self.active
            .as_ref()
            .map_or(Decimal::ZERO, |active| active.cart.subtotal())
    }

    /// Total number of units, not distinct products.
    pub fn item_count(&self) -> u64 {
        self.active
            .as_ref()
            .map_or(0, |active| active.cart.item_count())
    }

    /// Folds the anonymous cart into `new_owner`'s cart right after login.
    ///
    /// Overlapping products sum their quantities; the rest are appended. The
    /// result becomes the active cart and is persisted, then the anonymous
    /// entry is deleted. With an empty anonymous cart the owner's cart is
    /// loaded unchanged and nothing is written.
    #[instrument(skip_all, fields(owner = %new_owner))]
    pub async fn merge_anonymous_cart(&mut self, new_owner: PartitionKey) {
        let anonymous_key = PartitionKey::anonymous();
        if new_owner == anonymous_key {
            debug!("Merge target is the anonymous partition, nothing to do");
            return;
        }

        let anonymous = self.current_or_stored(&anonymous_key).await;
        let mut cart = self.current_or_stored(&new_owner).await;

        if anonymous.is_empty() {
            debug!("Anonymous cart is empty, keeping owner cart as-is");
            self.emit(CartEvent::Loaded {
                key: new_owner.clone(),
                items: cart.items().len(),
            });
            self.active = Some(ActiveCart {
                key: new_owner,
                cart,
            });
            return;
        }

        let merged_items = anonymous.items().len();
        cart.merge(anonymous);
        self.active = Some(ActiveCart {
            key: new_owner.clone(),
            cart,
        });
        self.persist().await;

        if let Err(e) = self.store.delete(anonymous_key.as_str()).await {
            warn!(error = %e, "Failed to delete anonymous cart after merge");
        }
        info!(merged_items, "Merged anonymous cart");
        self.emit(CartEvent::Merged {
            key: new_owner,
            merged_items,
        });
    }

    /// Snapshots the cart into an [`OrderSummary`] and clears it.
    ///
    /// Returns `None`, leaving everything untouched, when the cart is empty.
    pub async fn checkout(&mut self) -> Option<OrderSummary> {
        let cart = &self.ensure_loaded().await.cart;
        if cart.is_empty() {
            debug!("Checkout ignored, cart is empty");
            return None;
        }

        let order_number = generate_order_number(&mut rand::thread_rng());
        let summary = OrderSummary::from_cart(order_number, cart);
        self.clear().await;

        info!(
            order_number = %summary.order_number,
            total = %summary.total,
            items = summary.item_count,
            "Checked out cart"
        );
        self.emit(CartEvent::CheckedOut {
            order_number: summary.order_number.clone(),
        });
        Some(summary)
    }

    async fn ensure_loaded(&mut self) -> &mut ActiveCart {
        let key = PartitionKey::for_identity(self.identity.current().as_ref());
        let stale = self
            .active
            .as_ref()
            .is_none_or(|active| active.key != key);
        if stale {
            self.load(key.clone()).await;
        }
        self.active.get_or_insert_with(|| ActiveCart {
            key,
            cart: Cart::new(),
        })
    }

    /// The in-memory cart when `key` is active, otherwise the stored copy.
    async fn current_or_stored(&self, key: &PartitionKey) -> Cart {
        match &self.active {
            Some(active) if &active.key == key => active.cart.clone(),
            _ => self.read_cart(key).await,
        }
    }

    async fn read_cart(&self, key: &PartitionKey) -> Cart {
        match self.store.get(key.as_str()).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "Discarding unreadable stored cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read stored cart");
                Cart::new()
            }
        }
    }

    async fn persist(&self) {
        let Some(active) = &self.active else {
            return;
        };

        let payload = match serde_json::to_string(&active.cart) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %active.key, error = %e, "Failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.store.set(active.key.as_str(), payload).await {
            warn!(
                key = %active.key,
                error = %e,
                "Failed to persist cart, keeping in-memory state"
            );
        }
    }

    fn emit(&self, event: CartEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
