//! Authentication middleware
//!
//! Resolves the bearer token into a request-scoped identity and role

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::models::Role;

use crate::error::AppError;
use crate::services::auth::decode_token;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    /// Check if the user holds the Admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token.trim(),
        None => {
            return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response();
        }
    };

    let claims = match decode_token(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(AuthUser {
        username: claims.sub,
        role: claims.role,
    });

    next.run(request).await
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Admin guard for use in handlers
pub fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        let admin = AuthUser {
            username: "asha".into(),
            role: Role::Admin,
        };
        let clerk = AuthUser {
            username: "ravi".into(),
            role: Role::Staff("Clerk".into()),
        };
        assert!(require_admin(&admin).is_ok());
        assert!(matches!(
            require_admin(&clerk),
            Err(AppError::InsufficientPermissions)
        ));
    }
}
