//! Shared fixtures for backend integration tests

#![allow(dead_code)]

use std::sync::Arc;

use inventory_server::config::{Config, JwtConfig, ServerConfig, StoreConfig};
use inventory_server::services::{InventoryService, ItemLocks, StockService};
use inventory_server::store::{MemoryStore, RecordStore, Table};
use inventory_server::AppState;

pub const JWT_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        environment: "test".into(),
        server: ServerConfig::default(),
        store: StoreConfig::default(),
        jwt: JwtConfig {
            secret: JWT_SECRET.into(),
            access_token_expiry: 3600,
        },
    }
}

/// Inward row in sheet column order
pub fn inward_row(item: &str, quantity: i64, unit_cost: &str, balance: i64) -> Vec<String> {
    vec![
        "01-01-2024".to_string(),
        item.to_string(),
        quantity.to_string(),
        unit_cost.to_string(),
        "Acme".to_string(),
        balance.to_string(),
    ]
}

/// Two Bolt lots: 10 @ 2 then 5 @ 3, with a matching stock entry
pub fn bolt_store() -> MemoryStore {
    MemoryStore::new()
        .with_user("asha", "storepass", "Admin")
        .with_user("ravi", "clerkpass", "Clerk")
        .with_rows(
            Table::Inward,
            [inward_row("Bolt", 10, "2", 10), inward_row("Bolt", 5, "3", 5)],
        )
        .with_rows(Table::Stock, [["Bolt", "15"]])
}

pub fn inventory(store: &Arc<MemoryStore>) -> InventoryService {
    InventoryService::new(store.clone() as Arc<dyn RecordStore>, ItemLocks::new())
}

pub fn stock(store: &Arc<MemoryStore>) -> StockService {
    StockService::new(store.clone() as Arc<dyn RecordStore>)
}

pub fn app_state(store: &Arc<MemoryStore>) -> AppState {
    AppState::new(store.clone() as Arc<dyn RecordStore>, test_config())
}

/// Balance column of every Inward row
pub async fn lot_balances(store: &MemoryStore) -> Vec<String> {
    store
        .rows(Table::Inward)
        .await
        .into_iter()
        .map(|row| row.get(5).cloned().unwrap_or_default())
        .collect()
}

/// Balance recorded in the Stock table for `item` (exact name)
pub async fn stock_balance(store: &MemoryStore, item: &str) -> Option<String> {
    store
        .rows(Table::Stock)
        .await
        .into_iter()
        .find(|row| row.first().map(String::as_str) == Some(item))
        .and_then(|row| row.get(1).cloned())
}
