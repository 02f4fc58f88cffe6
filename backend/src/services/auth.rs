//! Authentication service for login and token management

use std::sync::Arc;

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::models::{Role, User};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::{RecordStore, Table};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn RecordStore>,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Username
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub username: String,
    pub role: Role,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(store: Arc<dyn RecordStore>, config: &Config) -> Self {
        Self {
            store,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Check credentials against the Users table and issue an access token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthTokens> {
        let user = match self.find_user(username, password).await? {
            Some(user) => user,
            None => {
                tracing::info!("Failed login for {}", username.trim());
                return Err(AppError::InvalidCredentials);
            }
        };

        let access_token = self.generate_token(&user)?;
        tracing::info!("User {} logged in as {}", user.username, user.role);

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            username: user.username,
            role: user.role,
        })
    }

    /// Decode and validate an access token
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        decode_token(token, &self.jwt_secret)
    }

    /// First row whose username and password both match; several rows may
    /// share a username
    async fn find_user(&self, username: &str, password: &str) -> AppResult<Option<User>> {
        let records = self.store.scan(Table::Users).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| User::from_fields(record.row, &record.fields).ok())
            .find(|user| user.matches_username(username) && password_matches(user, password)))
    }

    fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.username.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

/// Decode and validate an HS256 access token with `secret`
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Plaintext cells compare trimmed; bcrypt hashes are verified
fn password_matches(user: &User, candidate: &str) -> bool {
    if user.has_hashed_password() {
        verify(candidate.trim(), &user.password).unwrap_or(false)
    } else {
        !user.password.is_empty() && user.password.trim() == candidate.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, ServerConfig, StoreConfig};
    use crate::store::MemoryStore;

    fn service(store: MemoryStore) -> AuthService {
        let config = Config {
            environment: "test".into(),
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            jwt: JwtConfig {
                secret: "k".into(),
                access_token_expiry: 60,
            },
        };
        AuthService::new(Arc::new(store), &config)
    }

    fn user(password: &str) -> User {
        User {
            row: 0,
            username: "asha".into(),
            password: password.into(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_plaintext_password_trimmed() {
        assert!(password_matches(&user("hunter2 "), " hunter2"));
        assert!(!password_matches(&user("hunter2"), "hunter3"));
        assert!(!password_matches(&user(""), ""));
    }

    #[test]
    fn test_bcrypt_password() {
        let hashed = bcrypt::hash("hunter2", 4).unwrap();
        assert!(password_matches(&user(&hashed), "hunter2"));
        assert!(!password_matches(&user(&hashed), "nope"));
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let claims = Claims {
            sub: "asha".into(),
            role: Role::Admin,
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"right"),
        )
        .unwrap();

        assert!(decode_token(&token, "right").is_ok());
        assert!(matches!(decode_token(&token, "wrong"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_decode_reports_expiry() {
        let claims = Claims {
            sub: "asha".into(),
            role: Role::Staff("Clerk".into()),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"k")).unwrap();
        assert!(matches!(decode_token(&token, "k"), Err(AppError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_duplicate_usernames_match_on_password() {
        let auth = service(
            MemoryStore::new()
                .with_user("asha", "first", "Clerk")
                .with_user("Asha", "second", "Admin"),
        );

        let tokens = auth.login("asha", "second").await.unwrap();
        assert_eq!(tokens.username, "Asha");
        assert!(tokens.role.is_admin());

        let tokens = auth.login("ASHA", "first").await.unwrap();
        assert_eq!(tokens.role, Role::Staff("Clerk".into()));

        assert!(matches!(
            auth.login("asha", "third").await,
            Err(AppError::InvalidCredentials)
        ));
    }
}
