//! Store Inventory - server entry point

use std::net::SocketAddr;

use inventory_server::{build_store, config::Config, create_app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inventory_server=debug,tower_http=debug".into());
    let json_logs = std::env::var("INV_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let config = Config::load()?;

    tracing::info!("Starting Store Inventory Server");
    tracing::info!("Environment: {}", config.environment);

    let store = build_store(&config)?;
    tracing::info!("Record store: {}", store.backend_tag());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(store, config);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
