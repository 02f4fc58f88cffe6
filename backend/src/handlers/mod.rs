//! HTTP handlers

pub mod auth;
pub mod health;
pub mod inward;
pub mod outward;
pub mod stock;

pub use auth::*;
pub use health::*;
pub use inward::*;
pub use outward::*;
pub use stock::*;
