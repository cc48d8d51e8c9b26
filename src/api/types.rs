use serde::{Deserialize, Serialize};

use crate::roster::UserRecord;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body of `POST /api/admin`. All fields optional so missing parameters map
/// to 400 rather than a body-rejection status.
#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub action: Option<String>,
    #[serde(rename = "adminUser")]
    pub admin_user: Option<String>,
    #[serde(rename = "adminPass")]
    pub admin_pass: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct UserListDto {
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Serialize)]
pub struct MutationDto {
    pub action: String,
    pub commit: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: chrono::NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub version: String,
    pub uptime: u64,
}
