use handloom_hex::application::services::Services;
use handloom_hex::config::Config;
use handloom_hex::inbound::http::{HttpServer, HttpServerConfig};
use handloom_repo::build_session;
use handloom_types::domain::catalog::Catalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / SERVER_PORT / payment delays when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .init();

    let config = Config::from_env()?;
    let store = build_session(config.database_url.as_deref()).await?;
    let catalog = Catalog::sample()?;
    tracing::info!(
        products = catalog.list(&Default::default()).len(),
        categories = ?catalog.categories(),
        "catalog loaded"
    );
    let services = Services::init(store, catalog, &config).await?;

    let server_cfg = HttpServerConfig {
        host: config.server_host.clone(),
        port: config.server_port.clone(),
    };

    let http = HttpServer::new(services, server_cfg).await?;
    http.run().await
}
