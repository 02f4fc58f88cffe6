//! Domain models for the store inventory

mod inventory;
mod user;

pub use inventory::*;
pub use user::*;
