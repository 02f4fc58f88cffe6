//! Route definitions for the store inventory service

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes - stock receipts
        .nest("/inward", inward_routes(state.clone()))
        // Protected routes - stock issues
        .nest("/outward", outward_routes(state.clone()))
        // Protected routes - stock balances
        .nest("/stock", stock_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        // Login stays public; added after the layer so it is not wrapped
        .route("/login", post(handlers::login))
}

/// Inward routes (protected)
fn inward_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inward).post(handlers::record_inward))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Outward routes (protected)
fn outward_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_outward).post(handlers::issue_outward))
        .route("/preview", get(handlers::preview_outward))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Stock routes (protected)
fn stock_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock))
        .route("/items/:item", get(handlers::get_item_stock))
        .route("/reconciliation", get(handlers::get_stock_reconciliation))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
