use std::sync::Arc;

use crate::application::cart_service::CartService;
use crate::application::checkout_service::CheckoutService;
use crate::application::notifications::Notifier;
use crate::config::Config;
use crate::errors::AppError;
use handloom_types::domain::catalog::Catalog;
use handloom_types::ports::cart_repository::CartRepository;
use handloom_types::ports::order_log::OrderLog;

/// Everything one storefront session needs, sharing a single store.
pub struct Services<R: CartRepository + OrderLog> {
    pub catalog: Arc<Catalog>,
    pub notifier: Arc<Notifier>,
    pub cart: Arc<CartService<R>>,
    pub checkout: Arc<CheckoutService<R>>,
}

impl<R: CartRepository + OrderLog> Clone for Services<R> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            notifier: self.notifier.clone(),
            cart: self.cart.clone(),
            checkout: self.checkout.clone(),
        }
    }
}

impl<R: CartRepository + OrderLog> Services<R> {
    pub async fn init(store: R, catalog: Catalog, config: &Config) -> Result<Self, AppError> {
        let notifier = Arc::new(Notifier::new(config.toast_duration()));
        let cart = Arc::new(CartService::load(Arc::new(store), notifier.clone()).await?);
        let checkout = Arc::new(CheckoutService::new(
            cart.clone(),
            notifier.clone(),
            config.payment_delays(),
        ));
        Ok(Self {
            catalog: Arc::new(catalog),
            notifier,
            cart,
            checkout,
        })
    }
}
