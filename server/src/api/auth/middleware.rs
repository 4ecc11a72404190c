//! Authentication middleware
//!
//! Verifies the bearer token, re-reads the user row and injects the
//! resulting [`Actor`] into request extensions.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::jwt::{JwtError, validate_token};
use crate::data::Database;
use crate::data::types::Actor;

/// Authentication error response
#[derive(Debug)]
pub struct AuthError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AuthError {
    pub fn required() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "AUTH_REQUIRED",
            message: "Authentication required".to_string(),
        }
    }

    pub fn expired() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "TOKEN_EXPIRED",
            message: "Token has expired".to_string(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "TOKEN_INVALID",
            message: "Invalid token".to_string(),
        }
    }

    pub fn inactive() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "ACCOUNT_INACTIVE",
            message: "Account is inactive".to_string(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "SERVICE_UNAVAILABLE",
            message: "Storage is temporarily unavailable".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "code": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Shared auth state for middleware
#[derive(Clone)]
pub struct AuthState {
    pub database: Arc<Database>,
    pub signing_key: Arc<Vec<u8>>,
}

/// Require a valid bearer token and an active user.
///
/// The token only identifies the user; role and status come from the
/// current user row.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(AuthError::required)?;

    let claims = validate_token(token, &state.signing_key).map_err(|e| match e {
        JwtError::Expired => AuthError::expired(),
        _ => AuthError::invalid(),
    })?;
    let user_id = claims.user_id().ok_or_else(AuthError::invalid)?;

    let row = state
        .database
        .repository()
        .get_user(user_id)
        .await
        .map_err(|e| {
            tracing::error!(user_id, error = %e, "Failed to load actor");
            AuthError::unavailable()
        })?
        .ok_or_else(AuthError::invalid)?;

    let actor = Actor::from_row(&row).ok_or_else(|| {
        tracing::warn!(user_id, role = %row.role, status = %row.status, "Unrecognized user role or status");
        AuthError::invalid()
    })?;
    if !actor.is_active() {
        return Err(AuthError::inactive());
    }

    if claims.role != actor.role.as_str() {
        tracing::debug!(user_id, token_role = %claims.role, "Token role differs from stored role");
    }

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
