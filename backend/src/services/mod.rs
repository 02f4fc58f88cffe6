//! Business logic services for the store inventory

pub mod auth;
pub mod inventory;
pub mod locks;
pub mod stock;

pub use auth::AuthService;
pub use inventory::InventoryService;
pub use locks::ItemLocks;
pub use stock::StockService;
