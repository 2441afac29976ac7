use async_trait::async_trait;
use handloom_types::domain::cart::Cart;
use handloom_types::domain::order::Order;
use handloom_types::ports::cart_repository::CartRepository;
use handloom_types::ports::kv_store::{KeyValueStore, StoreError};
use handloom_types::ports::order_log::OrderLog;

pub const CART_KEY: &str = "handloom_cart_v1";
pub const ORDERS_KEY: &str = "handloom_orders";

/// Cart snapshot and order log serialized as JSON into any key-value store.
#[derive(Clone)]
pub struct SessionStore<S> {
    kv: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn store(&self) -> &S {
        &self.kv
    }

    async fn read_orders(&self) -> Result<Vec<Order>, StoreError> {
        match self.kv.get(ORDERS_KEY).await? {
            None => Ok(Vec::new()),
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl<S: KeyValueStore> CartRepository for SessionStore<S> {
    async fn load_cart(&self) -> Result<Cart, StoreError> {
        let Some(raw) = self.kv.get(CART_KEY).await? else {
            return Ok(Cart::new());
        };
        match Cart::from_snapshot(&raw) {
            Ok(cart) => Ok(cart),
            Err(e) => {
                tracing::error!(error = %e, "stored cart unreadable, starting empty");
                Ok(Cart::new())
            }
        }
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), StoreError> {
        let raw = cart
            .to_snapshot()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.kv.set(CART_KEY, raw).await
    }
}

#[async_trait]
impl<S: KeyValueStore> OrderLog for SessionStore<S> {
    async fn append(&self, order: Order) -> Result<Order, StoreError> {
        let mut orders = self.read_orders().await?;
        if orders.iter().any(|o| o.id == order.id) {
            return Err(StoreError::DuplicateOrder(order.id));
        }
        orders.push(order.clone());
        let raw =
            serde_json::to_string(&orders).map_err(|e| StoreError::Backend(e.to_string()))?;
        self.kv.set(ORDERS_KEY, raw).await?;
        Ok(order)
    }

    async fn list_newest_first(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders = self.read_orders().await?;
        orders.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(orders)
    }
}
