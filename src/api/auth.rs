//! The login gate for end users, with a per-username attempt lockout.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, LoginRequest, LoginResponse};
use crate::services::ServiceError;

/// POST /api/auth/login
///
/// Verifies a user against the current roster. Failed attempts count toward
/// the lockout; an expired account is rejected without a counter bump.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    if let Some(until) = state.lockouts.check(&payload.username) {
        return Err(ApiError::LockedOut(format!(
            "Too many failed attempts. Try again after {}",
            until.format("%Y-%m-%d %H:%M UTC")
        )));
    }

    match state
        .roster
        .verify_login(&payload.username, &payload.password)
        .await
    {
        Ok(user) => {
            state.lockouts.clear(&user.username);
            Ok(Json(ApiResponse::success(LoginResponse {
                username: user.username,
                expires_at: user.expires_at,
            })))
        }
        Err(ServiceError::InvalidCredentials) => {
            if let Some(until) = state.lockouts.record_failure(&payload.username) {
                tracing::warn!(username = %payload.username, until = %until, "login lockout tripped");
            }
            Err(ApiError::Unauthorized(
                "Invalid username or password".to_string(),
            ))
        }
        Err(err) => Err(err.into()),
    }
}
