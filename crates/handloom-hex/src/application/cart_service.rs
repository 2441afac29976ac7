use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, MutexGuard};

use crate::application::notifications::{Notifier, ToastOptions};
use crate::errors::AppError;
use handloom_types::domain::cart::{Cart, CartLineItem, CartView};
use handloom_types::domain::product::{Product, ProductId};
use handloom_types::ports::cart_repository::CartRepository;

/// The session cart. Every mutation is written through to the repository
/// before it becomes visible; a failed write leaves the cart as it was.
pub struct CartService<R: CartRepository> {
    repo: Arc<R>,
    cart: Mutex<Cart>,
    // Last committed state, readable while a checkout holds `cart`.
    published: RwLock<CartView>,
    notifier: Arc<Notifier>,
}

impl<R: CartRepository> CartService<R> {
    /// Restores the persisted cart (migrated on read) or starts empty.
    pub async fn load(repo: Arc<R>, notifier: Arc<Notifier>) -> Result<Self, AppError> {
        let cart = repo.load_cart().await.map_err(|e| {
            tracing::error!(error = %e, "failed to load cart");
            AppError::Persistence(e)
        })?;
        tracing::info!(lines = cart.len(), items = cart.total_items(), "cart restored");
        Ok(Self {
            repo,
            published: RwLock::new(CartView::from(&cart)),
            cart: Mutex::new(cart),
            notifier,
        })
    }

    pub fn repo(&self) -> &Arc<R> {
        &self.repo
    }

    /// The last committed cart. Never waits on a mutation or checkout in flight.
    pub fn view(&self) -> CartView {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn add_to_cart(&self, product: &Product) -> Result<CartLineItem, AppError> {
        let line = self
            .commit(|cart| cart.add_or_increment(product).clone())
            .await?;
        tracing::info!(
            product_id = %line.id,
            quantity = line.quantity,
            price = line.price.amount(),
            "added to cart"
        );
        if line.price.is_zero() {
            tracing::warn!(product_id = %line.id, "product has no usable price");
        }
        self.notifier
            .show(format!("{} added to cart.", product.name), ToastOptions::default());
        Ok(line)
    }

    /// `Ok(None)` when the cart has no such line.
    pub async fn update_quantity(
        &self,
        id: &ProductId,
        quantity: f64,
    ) -> Result<Option<CartLineItem>, AppError> {
        let mut guard = self.cart.lock().await;
        if guard.get(id).is_none() {
            return Ok(None);
        }
        let mut next = guard.clone();
        next.set_quantity(id, quantity);
        self.persist(&next).await?;
        *guard = next;
        self.publish(&guard);
        let line = guard.get(id).cloned();
        if let Some(l) = &line {
            tracing::info!(product_id = %id, quantity = l.quantity, "quantity updated");
        }
        Ok(line)
    }

    /// Idempotent; `Ok(false)` when nothing was removed.
    pub async fn remove_item(&self, id: &ProductId) -> Result<bool, AppError> {
        let mut guard = self.cart.lock().await;
        let Some(name) = guard.get(id).map(|l| l.name.clone()) else {
            return Ok(false);
        };
        let mut next = guard.clone();
        next.remove(id);
        self.persist(&next).await?;
        *guard = next;
        self.publish(&guard);
        tracing::info!(product_id = %id, "removed from cart");
        self.notifier
            .show(format!("{name} removed from cart"), ToastOptions::default());
        Ok(true)
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        self.commit(Cart::clear).await?;
        tracing::info!("cart cleared");
        self.notifier.show("Cart cleared", ToastOptions::default());
        Ok(())
    }

    /// Holds the cart for the whole checkout so no other writer interleaves.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().await
    }

    pub(crate) fn publish(&self, cart: &Cart) {
        *self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner) = CartView::from(cart);
    }

    pub(crate) async fn persist(&self, cart: &Cart) -> Result<(), AppError> {
        self.repo.save_cart(cart).await.map_err(|e| {
            tracing::error!(error = %e, "failed to persist cart");
            AppError::Persistence(e)
        })
    }

    async fn commit<T>(&self, apply: impl FnOnce(&mut Cart) -> T) -> Result<T, AppError> {
        let mut guard = self.cart.lock().await;
        let mut next = guard.clone();
        let out = apply(&mut next);
        self.persist(&next).await?;
        *guard = next;
        self.publish(&guard);
        Ok(out)
    }
}
