//! Google service-account authentication
//!
//! Signs a short-lived RS256 assertion with the service account key and
//! exchanges it for an OAuth access token, cached until shortly before expiry.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::store::{StoreError, StoreResult};

/// Scope needed to read and write spreadsheet values
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Seconds before expiry at which a cached token is refreshed
const REFRESH_MARGIN_SECS: i64 = 60;

/// Fields of a service account key file that are needed here
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Load a key file downloaded from the cloud console
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read credentials {}: {}", path.display(), e))?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid credentials {}: {}", path.display(), e))?;
        Ok(key)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Access-token provider for a service account
pub struct ServiceAccountAuth {
    http_client: reqwest::Client,
    client_email: String,
    encoding_key: EncodingKey,
    token_uri: String,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Build a provider; `token_uri` overrides the one in the key file
    pub fn new(
        http_client: reqwest::Client,
        key: ServiceAccountKey,
        token_uri: Option<String>,
    ) -> anyhow::Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid service account private key: {}", e))?;
        let token_uri = token_uri
            .or(key.token_uri)
            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string());

        Ok(Self {
            http_client,
            client_email: key.client_email,
            encoding_key,
            token_uri,
            cached: RwLock::new(None),
        })
    }

    /// Current access token, fetching a new one when the cache is stale
    pub async fn access_token(&self) -> StoreResult<String> {
        if let Some(token) = self.fresh_cached().await {
            return Ok(token);
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(entry) = cached.as_ref() {
            if is_fresh(entry, Utc::now()) {
                return Ok(entry.token.clone());
            }
        }

        let entry = self.fetch_token().await?;
        let token = entry.token.clone();
        *cached = Some(entry);
        Ok(token)
    }

    async fn fresh_cached(&self) -> Option<String> {
        let cached = self.cached.read().await;
        cached
            .as_ref()
            .filter(|entry| is_fresh(entry, Utc::now()))
            .map(|entry| entry.token.clone())
    }

    async fn fetch_token(&self) -> StoreResult<CachedToken> {
        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| StoreError::Malformed(format!("cannot sign token assertion: {}", e)))?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        tracing::debug!("Requesting access token for {}", self.client_email);
        let response = self
            .http_client
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, format!("token exchange failed: {}", body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(format!("cannot parse token response: {}", e)))?;

        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

fn is_fresh(entry: &CachedToken, now: DateTime<Utc>) -> bool {
    entry.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
}

/// Map a non-success HTTP status to a store error
pub fn classify_status(status: reqwest::StatusCode, message: String) -> StoreError {
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        StoreError::Unavailable(format!("{}: {}", status, message))
    } else {
        StoreError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}
