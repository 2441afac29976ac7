use async_trait::async_trait;

use crate::domain::cart::Cart;
use crate::ports::kv_store::StoreError;

#[async_trait]
pub trait CartRepository: Send + Sync + 'static {
    /// Loads the persisted cart, already migrated to canonical lines.
    async fn load_cart(&self) -> Result<Cart, StoreError>;
    /// Replaces the persisted snapshot with `cart`.
    async fn save_cart(&self, cart: &Cart) -> Result<(), StoreError>;
}
