#![cfg(feature = "memory")]

use chrono::{Duration, Utc};
use handloom_repo::memory::InMemoryStore;
use handloom_repo::session::{SessionStore, CART_KEY, ORDERS_KEY};
use handloom_types::domain::cart::Cart;
use handloom_types::domain::money::Money;
use handloom_types::domain::order::{Billing, CardDetails, OrderBuilder, PaymentSelection};
use handloom_types::domain::product::{Product, ProductId};
use handloom_types::ports::cart_repository::CartRepository;
use handloom_types::ports::kv_store::{KeyValueStore, StoreError};
use handloom_types::ports::order_log::OrderLog;

fn saree() -> Product {
    serde_json::from_value(serde_json::json!({
        "id": 1, "name": "Banarasi Handloom Saree", "image": "banarasi.jpg",
        "price": "Rs.1085", "priceNum": 1085
    }))
    .unwrap()
}

fn billing() -> Billing {
    Billing {
        name: "Test Buyer".into(),
        email: "test@example.com".into(),
        phone: "9876543210".into(),
        address: "1 Weaver Lane".into(),
        city: "Pune".into(),
        state: "Maharashtra".into(),
        zip: "411001".into(),
    }
}

fn card() -> PaymentSelection {
    PaymentSelection::Card(CardDetails {
        number: "4111 1111 1111 1111".into(),
        name: "Test Buyer".into(),
        expiry_month: "12".into(),
        expiry_year: "2030".into(),
        cvv: "321".into(),
    })
}

#[tokio::test]
async fn memory_store_kv_flow() {
    let store = InMemoryStore::new();
    assert!(store.get("missing").await.unwrap().is_none());

    store.set("k", "v1".into()).await.unwrap();
    store.set("k", "v2".into()).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));

    assert!(store.remove("k").await.unwrap());
    assert!(!store.remove("k").await.unwrap());
}

#[tokio::test]
async fn cart_snapshot_round_trips() {
    let session = SessionStore::new(InMemoryStore::new());
    assert!(session.load_cart().await.unwrap().is_empty());

    let mut cart = Cart::new();
    cart.add_or_increment(&saree());
    cart.add_or_increment(&saree());
    session.save_cart(&cart).await.unwrap();

    let loaded = session.load_cart().await.unwrap();
    assert_eq!(loaded, cart);
    assert_eq!(loaded.total_amount(), Money::new(2170));
}

#[tokio::test]
async fn legacy_cart_is_repaired_on_load() {
    let store = InMemoryStore::new();
    store
        .set(
            CART_KEY,
            r#"[{"id":1,"name":"Old","price":"Rs.1,085","quantity":0}]"#.into(),
        )
        .await
        .unwrap();
    let session = SessionStore::new(store);

    let cart = session.load_cart().await.unwrap();
    let line = cart.get(&ProductId::from(1)).unwrap();
    assert_eq!(line.price, Money::new(1085));
    assert_eq!(line.quantity, 1);
}

#[tokio::test]
async fn garbage_cart_loads_empty() {
    let store = InMemoryStore::new();
    store.set(CART_KEY, "{not json".into()).await.unwrap();
    let session = SessionStore::new(store);
    assert!(session.load_cart().await.unwrap().is_empty());
}

#[tokio::test]
async fn order_log_appends_and_sorts_newest_first() {
    let session = SessionStore::new(InMemoryStore::new());
    let mut cart = Cart::new();
    cart.add_or_increment(&saree());

    let now = Utc::now();
    let older = OrderBuilder::build_at(&cart, &billing(), &card(), now - Duration::hours(2)).unwrap();
    let newest = OrderBuilder::build_at(&cart, &billing(), &card(), now).unwrap();
    let middle = OrderBuilder::build_at(&cart, &billing(), &card(), now - Duration::hours(1)).unwrap();

    session.append(older.clone()).await.unwrap();
    session.append(newest.clone()).await.unwrap();
    session.append(middle.clone()).await.unwrap();

    let ids: Vec<String> = session
        .list_newest_first()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids, vec![newest.id, middle.id, older.id]);
}

#[tokio::test]
async fn duplicate_order_id_is_rejected() {
    let session = SessionStore::new(InMemoryStore::new());
    let mut cart = Cart::new();
    cart.add_or_increment(&saree());
    let order = OrderBuilder::build(&cart, &billing(), &card()).unwrap();

    session.append(order.clone()).await.unwrap();
    let again = session.append(order.clone()).await;
    assert_eq!(again, Err(StoreError::DuplicateOrder(order.id)));
    assert_eq!(session.list_newest_first().await.unwrap().len(), 1);
}

#[tokio::test]
async fn corrupt_order_log_is_reported() {
    let store = InMemoryStore::new();
    store.set(ORDERS_KEY, "[oops".into()).await.unwrap();
    let session = SessionStore::new(store);
    assert!(matches!(
        session.list_newest_first().await,
        Err(StoreError::Corrupt(_))
    ));
}
