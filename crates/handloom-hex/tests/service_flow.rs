use async_trait::async_trait;
use handloom_hex::application::services::Services;
use handloom_hex::config::Config;
use handloom_hex::errors::AppError;
use handloom_repo::memory::InMemoryStore;
use handloom_repo::session::{SessionStore, ORDERS_KEY};
use handloom_types::domain::catalog::Catalog;
use handloom_types::domain::money::Money;
use handloom_types::domain::order::{
    Billing, CheckoutPhase, CheckoutRequest, PaymentRecord, PaymentSelection,
};
use handloom_types::domain::product::ProductId;
use handloom_types::ports::cart_repository::CartRepository;
use handloom_types::ports::kv_store::{KeyValueStore, StoreError};
use handloom_types::ports::order_log::OrderLog;

fn instant_config() -> Config {
    Config::from_lookup(|key| match key {
        "CARD_PAYMENT_DELAY_MS" | "UPI_PAYMENT_DELAY_MS" => Some("0".into()),
        _ => None,
    })
    .unwrap()
}

fn billing() -> Billing {
    Billing {
        name: "Meera Das".into(),
        email: "meera@example.in".into(),
        phone: "9123456780".into(),
        address: "4 Weavers Colony".into(),
        city: "Pochampally".into(),
        state: "Telangana".into(),
        zip: "508284".into(),
    }
}

fn upi(id: &str) -> CheckoutRequest {
    CheckoutRequest {
        billing: billing(),
        payment: PaymentSelection::Upi { upi_id: id.into() },
    }
}

// Browse, fill the cart, pay by UPI, read the history back.
#[tokio::test]
async fn browse_add_checkout_history_flow() {
    let store = SessionStore::new(InMemoryStore::new());
    let catalog = Catalog::sample().unwrap();
    let svc = Services::init(store.clone(), catalog, &instant_config())
        .await
        .unwrap();

    let saree = svc.catalog.get(&ProductId::from(1)).unwrap().clone();
    let stole = svc.catalog.get(&ProductId::from(3)).unwrap().clone();
    svc.cart.add_to_cart(&saree).await.unwrap();
    svc.cart.add_to_cart(&saree).await.unwrap();
    svc.cart.add_to_cart(&stole).await.unwrap();

    let view = svc.cart.view();
    assert_eq!(view.total_items, 3);
    assert_eq!(view.total_amount, Money::new(2 * 1085 + 799));

    let order = svc.checkout.checkout(upi("meera@okaxis")).await.unwrap();
    assert_eq!(order.total_amount, Money::new(2 * 1085 + 799));
    assert_eq!(
        order.payment,
        PaymentRecord::Upi {
            upi_id: "meera@okaxis".into()
        }
    );
    assert_eq!(svc.checkout.phase(), CheckoutPhase::Completed);
    assert!(svc.cart.view().items.is_empty());

    // Same store seen from a fresh session.
    assert!(store.load_cart().await.unwrap().is_empty());
    let history = store.list_newest_first().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, order.id);
}

#[tokio::test]
async fn invalid_upi_is_rejected_and_cart_kept() {
    let store = SessionStore::new(InMemoryStore::new());
    let svc = Services::init(store, Catalog::sample().unwrap(), &instant_config())
        .await
        .unwrap();
    let dupatta = svc.catalog.get(&ProductId::from(2)).unwrap().clone();
    svc.cart.add_to_cart(&dupatta).await.unwrap();

    let err = svc.checkout.checkout(upi("bademail")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(svc.cart.view().total_items, 1);
    assert_eq!(svc.checkout.phase(), CheckoutPhase::Idle);
    assert!(svc
        .notifier
        .active()
        .iter()
        .any(|t| t.message == "Please fill in all required fields correctly"));
}

#[derive(Clone, Default)]
struct OrderWritesFail {
    inner: InMemoryStore,
}

#[async_trait]
impl KeyValueStore for OrderWritesFail {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        if key == ORDERS_KEY {
            return Err(StoreError::Backend("quota exceeded".into()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.remove(key).await
    }
}

#[tokio::test]
async fn failed_order_write_leaves_cart_untouched() {
    let store = SessionStore::new(OrderWritesFail::default());
    let svc = Services::init(store.clone(), Catalog::sample().unwrap(), &instant_config())
        .await
        .unwrap();
    let saree = svc.catalog.get(&ProductId::from(1)).unwrap().clone();
    svc.cart.add_to_cart(&saree).await.unwrap();

    let err = svc.checkout.checkout(upi("meera@okaxis")).await.unwrap_err();
    assert!(matches!(err, AppError::Persistence(StoreError::Backend(_))));

    assert_eq!(svc.cart.view().total_items, 1);
    assert_eq!(store.load_cart().await.unwrap().total_items(), 1);
    assert!(store.list_newest_first().await.unwrap().is_empty());
    assert_eq!(svc.checkout.phase(), CheckoutPhase::Idle);
}

#[tokio::test]
async fn cart_survives_a_new_session_on_the_same_store() {
    let store = SessionStore::new(InMemoryStore::new());
    {
        let svc = Services::init(store.clone(), Catalog::sample().unwrap(), &instant_config())
            .await
            .unwrap();
        let stole = svc.catalog.get(&ProductId::from(3)).unwrap().clone();
        svc.cart.add_to_cart(&stole).await.unwrap();
        svc.cart
            .update_quantity(&ProductId::from(3), 4.0)
            .await
            .unwrap();
    }

    let svc = Services::init(store, Catalog::sample().unwrap(), &instant_config())
        .await
        .unwrap();
    let view = svc.cart.view();
    assert_eq!(view.total_items, 4);
    assert_eq!(view.total_amount, Money::new(4 * 799));
}
