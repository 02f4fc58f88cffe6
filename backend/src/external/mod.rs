//! External API integrations

pub mod google_auth;
pub mod sheets;

pub use google_auth::ServiceAccountAuth;
pub use sheets::SheetsStore;
