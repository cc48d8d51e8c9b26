//! The admin action endpoint: one `POST` body carrying the action, the admin
//! credentials, and the action payload, exactly as the managed front end
//! sends them.

use axum::{Json, extract::State, response::{IntoResponse, Response}};
use std::sync::Arc;

use super::{AdminRequest, ApiError, ApiResponse, AppState, MutationDto, UserListDto};
use crate::roster::{CreatePayload, DeletePayload, EditPayload};
use crate::services::{AdminCredentials, RosterOp};

/// POST /api/admin
///
/// `list` authorizes and returns the roster without touching the remote
/// write endpoint; every other action commits the rewritten block.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdminRequest>,
) -> Result<Response, ApiError> {
    let action = required(request.action, "action")?;
    let creds = AdminCredentials {
        username: required(request.admin_user, "adminUser")?,
        password: required(request.admin_pass, "adminPass")?,
    };

    if action == "list" {
        let users = state.roster.list_users(&creds).await?;
        return Ok(Json(ApiResponse::success(UserListDto { users })).into_response());
    }

    let payload = request.payload.unwrap_or(serde_json::Value::Null);
    let op = match action.as_str() {
        "create" => RosterOp::Create(decode::<CreatePayload>(payload, &action)?),
        "edit" => RosterOp::Edit(decode::<EditPayload>(payload, &action)?),
        "delete" => RosterOp::Delete(decode::<DeletePayload>(payload, &action)?),
        other => {
            return Err(ApiError::validation(format!("Unknown action '{other}'")));
        }
    };

    let outcome = state.roster.apply(&creds, &op).await?;
    Ok(Json(ApiResponse::success(MutationDto {
        action,
        commit: outcome.commit_sha,
    }))
    .into_response())
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{name} is required")))
}

fn decode<T: serde::de::DeserializeOwned>(
    payload: serde_json::Value,
    action: &str,
) -> Result<T, ApiError> {
    serde_json::from_value(payload)
        .map_err(|_| ApiError::validation(format!("Missing or invalid payload for '{action}'")))
}
