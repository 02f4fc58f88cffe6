//! Store Inventory - Backend Server
//!
//! Tracks stock received into a single store, issues it out with FIFO
//! costing and keeps a running balance per item. All records live in an
//! external spreadsheet.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use config::StoreBackend;
use services::ItemLocks;
use store::{MemoryStore, RecordStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub locks: ItemLocks,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> Self {
        Self {
            store,
            locks: ItemLocks::new(),
            config: Arc::new(config),
        }
    }
}

/// Build the record store selected in configuration
pub fn build_store(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.store.backend {
        StoreBackend::Sheets => {
            let store = external::SheetsStore::from_config(&config.store)?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; records are lost on restart");
            let store = MemoryStore::new().with_user(
                "admin",
                &config.store.memory_admin_password,
                "Admin",
            );
            Ok(Arc::new(store))
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Store Inventory API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
