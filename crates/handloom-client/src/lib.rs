//! Typed client for the storefront session API.

use std::time::Duration;

use anyhow::Context;
use handloom_types::domain::cart::CartView;
use handloom_types::domain::catalog::CatalogQuery;
use handloom_types::domain::notification::Toast;
use handloom_types::domain::order::{CheckoutPhase, CheckoutRequest, Order};
use handloom_types::domain::product::{Product, ProductId};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct HandloomClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

#[derive(Clone)]
pub struct HandloomClient {
    base: Url,
    client: reqwest::Client,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct UpdateQuantityRequest {
    pub quantity: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseResponse {
    pub phase: CheckoutPhase,
}

impl HandloomClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<HandloomClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(HandloomClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    pub async fn products(&self, query: &CatalogQuery) -> anyhow::Result<Vec<Product>> {
        let res = self
            .client
            .get(self.url("products")?)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn cart(&self) -> anyhow::Result<CartView> {
        let res = self
            .client
            .get(self.url("cart")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn add_to_cart(&self, product: &Product) -> anyhow::Result<CartView> {
        let res = self
            .client
            .post(self.url("cart/items")?)
            .json(product)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn update_quantity(&self, id: &ProductId, quantity: f64) -> anyhow::Result<CartView> {
        let res = self
            .client
            .patch(self.url(&format!("cart/items/{id}"))?)
            .json(&UpdateQuantityRequest { quantity })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn remove_item(&self, id: &ProductId) -> anyhow::Result<()> {
        self.client
            .delete(self.url(&format!("cart/items/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn clear_cart(&self) -> anyhow::Result<()> {
        self.client
            .delete(self.url("cart")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn checkout(&self, req: &CheckoutRequest) -> anyhow::Result<Order> {
        let res = self
            .client
            .post(self.url("checkout")?)
            .json(req)
            .send()
            .await?
            .error_for_status()?;
        let order: Order = res.json().await?;
        tracing::debug!(order_id = %order.id, "checkout completed");
        Ok(order)
    }

    pub async fn checkout_phase(&self) -> anyhow::Result<CheckoutPhase> {
        let res = self
            .client
            .get(self.url("checkout")?)
            .send()
            .await?
            .error_for_status()?;
        let body: PhaseResponse = res.json().await?;
        Ok(body.phase)
    }

    pub async fn orders(&self) -> anyhow::Result<Vec<Order>> {
        let res = self
            .client
            .get(self.url("orders")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn notifications(&self) -> anyhow::Result<Vec<Toast>> {
        let res = self
            .client
            .get(self.url("notifications")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn dismiss_notification(&self, id: u64) -> anyhow::Result<()> {
        self.client
            .delete(self.url(&format!("notifications/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl HandloomClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<HandloomClient> {
        if let Some(client) = self.client {
            return Ok(HandloomClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(HandloomClient {
            base: self.base,
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handloom_types::domain::cart::CartLineItem;
    use handloom_types::domain::money::Money;
    use handloom_types::domain::order::{
        Billing, OrderStatus, PaymentRecord, PaymentSelection,
    };
    use httpmock::prelude::*;

    fn line() -> CartLineItem {
        CartLineItem {
            id: ProductId::from(1),
            name: "Banarasi Handloom Saree".into(),
            image: "images/banarasi.jpg".into(),
            price: Money::new(1085),
            price_text: "Rs.1085".into(),
            quantity: 2,
        }
    }

    fn view() -> CartView {
        CartView {
            items: vec![line()],
            total_items: 2,
            total_amount: Money::new(2170),
        }
    }

    fn order() -> Order {
        Order {
            id: "ORD-1700000000000-abc123def".into(),
            date: chrono::Utc::now(),
            items: vec![line()],
            total_items: 2,
            total_amount: Money::new(2170),
            payment: PaymentRecord::Upi {
                upi_id: "asha@okaxis".into(),
            },
            billing: Billing::default(),
            status: OrderStatus::Completed,
        }
    }

    #[tokio::test]
    async fn cart_calls_hit_expected_routes() {
        let server = MockServer::start();

        let update_mock = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/cart/items/1")
                .json_body(serde_json::json!({ "quantity": 2.0 }));
            then.status(200).json_body_obj(&view());
        });
        let remove_mock = server.mock(|when, then| {
            when.method(DELETE).path("/cart/items/1");
            then.status(204);
        });
        let clear_mock = server.mock(|when, then| {
            when.method(DELETE).path("/cart");
            then.status(204);
        });

        let client = HandloomClient::new(&server.base_url()).unwrap();
        let updated = client
            .update_quantity(&ProductId::from(1), 2.0)
            .await
            .unwrap();
        assert_eq!(updated.total_amount, Money::new(2170));
        client.remove_item(&ProductId::from(1)).await.unwrap();
        client.clear_cart().await.unwrap();

        update_mock.assert();
        remove_mock.assert();
        clear_mock.assert();
    }

    #[tokio::test]
    async fn checkout_and_history() {
        let server = MockServer::start();
        let placed = order();

        let checkout_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/checkout")
                .json_body_partial(r#"{ "payment": { "method": "upi", "upiId": "asha@okaxis" } }"#);
            then.status(201).json_body_obj(&placed);
        });
        let phase_mock = server.mock(|when, then| {
            when.method(GET).path("/checkout");
            then.status(200).json_body(serde_json::json!({ "phase": "completed" }));
        });
        let orders_mock = server.mock(|when, then| {
            when.method(GET).path("/orders");
            then.status(200).json_body_obj(&vec![placed.clone()]);
        });

        let client = HandloomClient::builder(&server.base_url())
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let got = client
            .checkout(&CheckoutRequest {
                billing: Billing::default(),
                payment: PaymentSelection::Upi {
                    upi_id: "asha@okaxis".into(),
                },
            })
            .await
            .unwrap();
        assert_eq!(got.id, placed.id);
        assert_eq!(client.checkout_phase().await.unwrap(), CheckoutPhase::Completed);
        assert_eq!(client.orders().await.unwrap().len(), 1);

        checkout_mock.assert();
        phase_mock.assert();
        orders_mock.assert();
    }

    #[tokio::test]
    async fn rejected_checkout_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/checkout");
            then.status(422).json_body(serde_json::json!({
                "error": "Please fill in all required fields correctly",
                "errors": [{ "field": "cart", "message": "Your cart is empty." }]
            }));
        });

        let client = HandloomClient::new(&server.base_url()).unwrap();
        let err = client
            .checkout(&CheckoutRequest {
                billing: Billing::default(),
                payment: PaymentSelection::Upi {
                    upi_id: "asha@okaxis".into(),
                },
            })
            .await
            .unwrap_err();
        let status = err.downcast_ref::<reqwest::Error>().and_then(|e| e.status());
        assert_eq!(status, Some(reqwest::StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[tokio::test]
    async fn custom_headers_are_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/notifications")
                .header("x-session", "tab-1");
            then.status(200).json_body(serde_json::json!([]));
        });

        let client = HandloomClient::builder(&server.base_url())
            .unwrap()
            .with_header("x-session", "tab-1")
            .unwrap()
            .build()
            .unwrap();
        assert!(client.notifications().await.unwrap().is_empty());
        mock.assert();
    }
}
