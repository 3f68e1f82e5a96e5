use cart_engine::domain::events::CartEvent;
use cart_engine::domain::identity::{Identity, PartitionKey};
use cart_engine::domain::ports::DurableStore;
use cart_engine::infrastructure::identity::SessionIdentity;
use cart_engine::infrastructure::in_memory::InMemoryStore;
use rust_decimal_macros::dec;

mod common;
use common::{engine, product, qty, quantities, stored_cart};

/// Persists `[A:2, B:1]` for user `u1` and leaves the engine signed out.
async fn seed_user_cart(store: &InMemoryStore) {
    let mut engine = engine(store, &SessionIdentity::signed_in("u1"));
    engine.add_item(product("A", dec!(2.00)), qty(2)).await;
    engine.add_item(product("B", dec!(3.00)), qty(1)).await;
}

#[tokio::test]
async fn test_merge_sums_overlapping_quantities() {
    let store = InMemoryStore::new();
    seed_user_cart(&store).await;

    let identity = SessionIdentity::new();
    let mut engine = engine(&store, &identity);
    engine.add_item(product("A", dec!(9.00)), qty(1)).await;
    engine.add_item(product("C", dec!(4.00)), qty(2)).await;

    identity.sign_in(Identity::new("u1"));
    engine.merge_anonymous_cart(PartitionKey::user("u1")).await;

    let mut merged = quantities(engine.items());
    merged.sort();
    assert_eq!(
        merged,
        vec![
            ("A".to_string(), 3),
            ("B".to_string(), 1),
            ("C".to_string(), 2)
        ]
    );
    // A keeps the user's price snapshot.
    assert_eq!(engine.total_price(), "17.00");
    assert_eq!(engine.partition_key(), Some(&PartitionKey::user("u1")));

    let stored = stored_cart(&store, "cart_u1").await.unwrap();
    assert_eq!(stored.items(), engine.items());
    assert!(store.get("cart_anonymous").await.unwrap().is_none());
}

#[tokio::test]
async fn test_merge_with_empty_anonymous_cart_is_noop() {
    let store = InMemoryStore::new();
    seed_user_cart(&store).await;
    let before = store.get("cart_u1").await.unwrap();

    let identity = SessionIdentity::new();
    let mut engine = engine(&store, &identity);
    engine.sync_identity().await;

    identity.sign_in(Identity::new("u1"));
    engine.merge_anonymous_cart(PartitionKey::user("u1")).await;

    assert_eq!(
        quantities(engine.items()),
        vec![("A".to_string(), 2), ("B".to_string(), 1)]
    );
    assert_eq!(store.get("cart_u1").await.unwrap(), before);
}

#[tokio::test]
async fn test_merge_into_new_user_moves_anonymous_items() {
    let store = InMemoryStore::new();
    let identity = SessionIdentity::new();
    let mut engine = engine(&store, &identity);
    engine.add_item(product("X", dec!(1.50)), qty(4)).await;

    identity.sign_in(Identity::new("fresh"));
    engine.merge_anonymous_cart(PartitionKey::user("fresh")).await;

    assert_eq!(quantities(engine.items()), vec![("X".to_string(), 4)]);
    assert!(stored_cart(&store, "cart_fresh").await.is_some());
    assert!(stored_cart(&store, "cart_anonymous").await.is_none());

    // Identity already matches the merged partition: no reload happens.
    engine.sync_identity().await;
    assert_eq!(engine.item_count(), 4);
}

#[tokio::test]
async fn test_merge_reads_persisted_anonymous_cart() {
    let store = InMemoryStore::new();
    {
        let mut anonymous = engine(&store, &SessionIdentity::new());
        anonymous.add_item(product("A", dec!(1.00)), qty(1)).await;
    }
    seed_user_cart(&store).await;

    let identity = SessionIdentity::signed_in("u1");
    let mut engine = engine(&store, &identity);
    engine.merge_anonymous_cart(PartitionKey::user("u1")).await;

    assert_eq!(
        quantities(engine.items()),
        vec![("A".to_string(), 3), ("B".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_merge_publishes_event() {
    let store = InMemoryStore::new();
    let identity = SessionIdentity::new();
    let mut engine = engine(&store, &identity);
    engine.add_item(product("A", dec!(1.00)), qty(1)).await;

    let mut events = engine.subscribe();
    identity.sign_in(Identity::new("u9"));
    engine.merge_anonymous_cart(PartitionKey::user("u9")).await;

    assert_eq!(
        events.recv().await.unwrap(),
        CartEvent::Merged {
            key: PartitionKey::user("u9"),
            merged_items: 1
        }
    );
}
