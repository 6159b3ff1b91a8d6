//! Data Transfer Objects - request/response types for the JSON API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

impl AuthResponse {
    pub fn bearer(access_token: String, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// Declaration of one model registered in the admin console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminModelInfo {
    pub model: String,
    pub verbose_name: String,
    pub verbose_name_plural: String,
    pub list_display: Vec<String>,
    pub list_editable: Vec<String>,
    pub search_fields: Vec<String>,
    pub list_filter: Vec<String>,
    pub prepopulated_fields: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeListRowResponse {
    pub pk: Uuid,
    pub values: Vec<String>,
}

/// One page of an admin change list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeListResponse {
    pub model: String,
    pub columns: Vec<String>,
    pub rows: Vec<ChangeListRowResponse>,
    pub page: u64,
    pub num_pages: u64,
    pub count: u64,
}

/// In-place edit of change-list columns, keyed by column name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InlineEditRequest {
    #[serde(flatten)]
    pub columns: BTreeMap<String, serde_json::Value>,
}

/// Request to create a group. A blank slug is derived from the title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}
