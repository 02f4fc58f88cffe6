//! User and role models

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{columns, optional, required, Fields, RowError};

/// Role attached to a user account.
///
/// The Users sheet stores a free-form role name; only "Admin" carries
/// extra privileges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Staff(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Staff(raw.to_string())
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::parse(&raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Staff(name) => write!(f, "{}", name),
        }
    }
}

/// A user account read from the Users sheet
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub row: usize,
    pub username: String,
    /// Plaintext or bcrypt hash, as stored in the sheet
    pub password: String,
    pub role: Role,
}

impl User {
    pub fn from_fields(row: usize, fields: &Fields) -> Result<Self, RowError> {
        Ok(Self {
            row,
            username: required(fields, columns::USERNAME)?.to_string(),
            password: optional(fields, columns::PASSWORD).to_string(),
            role: Role::parse(optional(fields, columns::ROLE)),
        })
    }

    /// Usernames match trimmed and case-insensitively
    pub fn matches_username(&self, candidate: &str) -> bool {
        self.username.trim().to_lowercase() == candidate.trim().to_lowercase()
    }

    /// Whether the stored password is a bcrypt hash rather than plaintext
    pub fn has_hashed_password(&self) -> bool {
        ["$2a$", "$2b$", "$2y$"]
            .iter()
            .any(|prefix| self.password.starts_with(prefix))
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("row", &self.row)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}
