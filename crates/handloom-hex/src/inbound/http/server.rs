use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    serve, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::services::Services;
use crate::errors::AppError;
use handloom_types::domain::cart::CartView;
use handloom_types::domain::catalog::CatalogQuery;
use handloom_types::domain::notification::Toast;
use handloom_types::domain::order::{CheckoutPhase, CheckoutRequest, Order};
use handloom_types::domain::product::{Product, ProductId};
use handloom_types::ports::cart_repository::CartRepository;
use handloom_types::ports::order_log::OrderLog;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: String,
}

pub struct HttpServer<R>
where
    R: CartRepository + OrderLog,
{
    pub services: Services<R>,
    pub config: HttpServerConfig,
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: f64,
}

#[derive(Serialize)]
struct PhaseResponse {
    phase: CheckoutPhase,
}

impl<R> HttpServer<R>
where
    R: CartRepository + OrderLog,
{
    pub async fn new(services: Services<R>, config: HttpServerConfig) -> anyhow::Result<Self> {
        Ok(Self { services, config })
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        Router::new()
            .route("/health", get(health))
            .route("/products", get(list_products::<R>))
            .route("/cart", get(get_cart::<R>).delete(clear_cart::<R>))
            .route("/cart/items", post(add_item::<R>))
            .route(
                "/cart/items/{id}",
                patch(update_item::<R>).delete(remove_item::<R>),
            )
            .route("/checkout", get(checkout_phase::<R>).post(checkout::<R>))
            .route("/orders", get(list_orders::<R>))
            .route("/notifications", get(list_notifications::<R>))
            .route("/notifications/{id}", delete(dismiss_notification::<R>))
            .layer(trace_layer)
            .with_state(self.services.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = self.router();
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn list_products<R>(
    State(services): State<Services<R>>,
    Query(query): Query<CatalogQuery>,
) -> Json<Vec<Product>>
where
    R: CartRepository + OrderLog,
{
    Json(services.catalog.list(&query))
}

async fn get_cart<R>(State(services): State<Services<R>>) -> Json<CartView>
where
    R: CartRepository + OrderLog,
{
    Json(services.cart.view())
}

async fn add_item<R>(
    State(services): State<Services<R>>,
    Json(product): Json<Product>,
) -> Result<(StatusCode, Json<CartView>), AppError>
where
    R: CartRepository + OrderLog,
{
    if product.id.as_str().trim().is_empty() {
        return Err(AppError::BadRequest("product id is required".into()));
    }
    services.cart.add_to_cart(&product).await?;
    Ok((StatusCode::CREATED, Json(services.cart.view())))
}

async fn update_item<R>(
    State(services): State<Services<R>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>, AppError>
where
    R: CartRepository + OrderLog,
{
    let id = ProductId::from(id.as_str());
    match services.cart.update_quantity(&id, payload.quantity).await? {
        Some(_) => Ok(Json(services.cart.view())),
        None => Err(AppError::NotFound(format!("cart item {id}"))),
    }
}

async fn remove_item<R>(
    State(services): State<Services<R>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError>
where
    R: CartRepository + OrderLog,
{
    services
        .cart
        .remove_item(&ProductId::from(id.as_str()))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cart<R>(State(services): State<Services<R>>) -> Result<StatusCode, AppError>
where
    R: CartRepository + OrderLog,
{
    services.cart.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn checkout_phase<R>(State(services): State<Services<R>>) -> Json<PhaseResponse>
where
    R: CartRepository + OrderLog,
{
    Json(PhaseResponse {
        phase: services.checkout.phase(),
    })
}

async fn checkout<R>(
    State(services): State<Services<R>>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>), AppError>
where
    R: CartRepository + OrderLog,
{
    let order = services.checkout.checkout(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders<R>(State(services): State<Services<R>>) -> Result<Json<Vec<Order>>, AppError>
where
    R: CartRepository + OrderLog,
{
    Ok(Json(services.checkout.orders().await?))
}

async fn list_notifications<R>(State(services): State<Services<R>>) -> Json<Vec<Toast>>
where
    R: CartRepository + OrderLog,
{
    Json(services.notifier.active())
}

async fn dismiss_notification<R>(
    State(services): State<Services<R>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError>
where
    R: CartRepository + OrderLog,
{
    if services.notifier.dismiss(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("notification {id}")))
    }
}
