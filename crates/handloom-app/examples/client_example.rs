///  To run :
///  cargo r --example client_example
use handloom_client::HandloomClient;
use handloom_hex::application::services::Services;
use handloom_hex::config::Config;
use handloom_hex::inbound::http::{HttpServer, HttpServerConfig};
use handloom_repo::build_session;
use handloom_types::domain::catalog::{Catalog, CatalogQuery, SortOrder};
use handloom_types::domain::order::{Billing, CardDetails, CheckoutRequest, PaymentSelection};
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // File-backed session, as the binary uses by default.
    let tmp = tempdir()?;
    let db_url = format!("sqlite://{}", tmp.path().join("handloom.db").display());

    let config = Config::from_lookup(|key| match key {
        "CARD_PAYMENT_DELAY_MS" => Some("300".into()),
        _ => None,
    })?;
    let store = build_session(Some(&db_url)).await?;
    let services = Services::init(store, Catalog::sample()?, &config).await?;
    let server = HttpServer::new(
        services,
        HttpServerConfig {
            host: "127.0.0.1".into(),
            port: port.to_string(),
        },
    )
    .await?;

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = HandloomClient::new(&addr)?;
    let products = client
        .products(&CatalogQuery {
            sort: SortOrder::PriceLow,
            ..Default::default()
        })
        .await?;
    for p in &products {
        println!("{:<32} {}", p.name, p.unit_price());
    }

    let cheapest = &products[0];
    client.add_to_cart(cheapest).await?;
    let cart = client.update_quantity(&cheapest.id, 2.0).await?;
    println!("Cart: {} items, {}", cart.total_items, cart.total_amount);

    let order = client
        .checkout(&CheckoutRequest {
            billing: Billing {
                name: "Example Buyer".into(),
                email: "buyer@example.com".into(),
                phone: "9876543210".into(),
                address: "1 Handloom Lane".into(),
                city: "Kota".into(),
                state: "Rajasthan".into(),
                zip: "324001".into(),
            },
            payment: PaymentSelection::Card(CardDetails {
                number: "4111 1111 1111 1111".into(),
                name: "Example Buyer".into(),
                expiry_month: "12".into(),
                expiry_year: "2030".into(),
                cvv: "123".into(),
            }),
        })
        .await?;
    println!("Placed order {} for {}", order.id, order.total_amount);

    for toast in client.notifications().await? {
        println!("[{:?}] {}", toast.kind, toast.message);
    }
    assert!(client.cart().await?.items.is_empty());
    println!("Orders on file: {}", client.orders().await?.len());

    handle.abort();
    Ok(())
}
