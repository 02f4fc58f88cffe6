//! Shared types and models for the store inventory service
//!
//! This crate holds the sheet row models and the FIFO planning logic used by
//! the backend. It performs no I/O.

pub mod fifo;
pub mod models;
pub mod types;
pub mod validation;

pub use fifo::*;
pub use models::*;
pub use types::*;
pub use validation::*;
