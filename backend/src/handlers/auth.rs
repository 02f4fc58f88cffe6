//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared::models::Role;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub username: String,
    pub role: Role,
    pub is_admin: bool,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    body.validate()?;

    let auth_service = AuthService::new(state.store.clone(), &state.config);
    let tokens = auth_service.login(&body.username, &body.password).await?;

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        token_type: tokens.token_type,
        expires_in: tokens.expires_in,
        username: tokens.username,
        role: tokens.role,
    }))
}

/// Logout endpoint handler; tokens are stateless so the client drops its copy
pub async fn logout(current_user: CurrentUser) -> StatusCode {
    tracing::info!("User {} logged out", current_user.0.username);
    StatusCode::NO_CONTENT
}

/// Current identity
pub async fn me(current_user: CurrentUser) -> Json<MeResponse> {
    let user = current_user.0;
    Json(MeResponse {
        is_admin: user.is_admin(),
        username: user.username,
        role: user.role,
    })
}
