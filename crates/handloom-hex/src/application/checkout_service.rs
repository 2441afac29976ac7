use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::application::cart_service::CartService;
use crate::application::notifications::{Notifier, ToastOptions};
use crate::config::PaymentDelays;
use crate::errors::AppError;
use handloom_types::domain::cart::Cart;
use handloom_types::domain::order::{CheckoutPhase, CheckoutRequest, Order, OrderBuilder};
use handloom_types::domain::validation::ValidationError;
use handloom_types::ports::cart_repository::CartRepository;
use handloom_types::ports::order_log::OrderLog;

const SUCCESS_TOAST: Duration = Duration::from_millis(4000);

/// Runs the mock payment flow and records completed orders.
pub struct CheckoutService<R: CartRepository + OrderLog> {
    cart: Arc<CartService<R>>,
    notifier: Arc<Notifier>,
    delays: PaymentDelays,
    phase: Mutex<CheckoutPhase>,
}

// Puts the phase back to Idle unless the checkout completed.
struct PhaseGuard<'a> {
    phase: &'a Mutex<CheckoutPhase>,
    completed: bool,
}

impl<'a> PhaseGuard<'a> {
    fn begin(phase: &'a Mutex<CheckoutPhase>) -> Result<Self, AppError> {
        let mut current = phase.lock().unwrap_or_else(PoisonError::into_inner);
        if !current.accepts_submission() {
            return Err(AppError::CheckoutInProgress);
        }
        *current = CheckoutPhase::Validating;
        Ok(Self {
            phase,
            completed: false,
        })
    }

    fn set(&self, next: CheckoutPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn complete(mut self) {
        self.set(CheckoutPhase::Completed);
        self.completed = true;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.set(CheckoutPhase::Idle);
        }
    }
}

impl<R: CartRepository + OrderLog> CheckoutService<R> {
    pub fn new(cart: Arc<CartService<R>>, notifier: Arc<Notifier>, delays: PaymentDelays) -> Self {
        Self {
            cart,
            notifier,
            delays,
            phase: Mutex::new(CheckoutPhase::Idle),
        }
    }

    pub fn phase(&self) -> CheckoutPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validates, simulates the payment, appends the order and only then
    /// empties the cart. Any failure before the append leaves the cart as is.
    ///
    /// Runs on its own task: dropping the returned future (a client hanging
    /// up) does not stop a checkout halfway between storing the order and
    /// clearing the cart.
    pub async fn checkout(self: &Arc<Self>, request: CheckoutRequest) -> Result<Order, AppError> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run(request).await })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "checkout task failed");
                AppError::Internal(anyhow::anyhow!("checkout task failed: {e}"))
            })?
    }

    async fn run(&self, request: CheckoutRequest) -> Result<Order, AppError> {
        let phase = PhaseGuard::begin(&self.phase)?;
        let mut cart = self.cart.lock().await;

        if let Err(err) = OrderBuilder::validate(&cart, &request.billing, &request.payment) {
            return Err(self.reject(err));
        }

        phase.set(CheckoutPhase::Processing);
        let method = request.payment.method();
        let delay = self.delays.for_method(method);
        tracing::info!(?method, delay_ms = delay.as_millis() as u64, "processing payment");
        tokio::time::sleep(delay).await;

        let order = OrderBuilder::build(&cart, &request.billing, &request.payment)
            .map_err(|err| self.reject(err))?;
        let order = self.cart.repo().append(order).await.map_err(|e| {
            tracing::error!(error = %e, "failed to store order, cart left intact");
            self.notifier.show(
                "Could not save your order. Please try again.",
                ToastOptions::error(),
            );
            AppError::Persistence(e)
        })?;

        let cleared = Cart::new();
        if let Err(e) = self.cart.persist(&cleared).await {
            tracing::warn!(order_id = %order.id, error = ?e, "order stored but cart snapshot not cleared");
        }
        *cart = cleared;
        self.cart.publish(&cart);
        phase.complete();

        tracing::info!(
            order_id = %order.id,
            total_items = order.total_items,
            total_amount = order.total_amount.amount(),
            "order completed"
        );
        self.notifier.show(
            format!("Payment successful! Order ID: {}", order.id),
            ToastOptions::success().with_duration(SUCCESS_TOAST),
        );
        Ok(order)
    }

    pub async fn orders(&self) -> Result<Vec<Order>, AppError> {
        self.cart.repo().list_newest_first().await.map_err(|e| {
            tracing::error!(error = %e, "failed to load order history");
            AppError::Persistence(e)
        })
    }

    fn reject(&self, err: ValidationError) -> AppError {
        let message = if err.is_empty_cart() {
            "Your cart is empty."
        } else if err.is_zero_total() {
            "Invalid cart total. Please refresh and try again."
        } else {
            "Please fill in all required fields correctly"
        };
        tracing::warn!(failures = err.errors.len(), "checkout rejected");
        self.notifier.show(message, ToastOptions::error());
        AppError::Validation(err)
    }
}
