use async_trait::async_trait;

use crate::domain::order::Order;
use crate::ports::kv_store::StoreError;

/// Append-only order history.
#[async_trait]
pub trait OrderLog: Send + Sync + 'static {
    async fn append(&self, order: Order) -> Result<Order, StoreError>;
    /// Every stored order, newest `date` first.
    async fn list_newest_first(&self) -> Result<Vec<Order>, StoreError>;
}
