use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// -- Users --

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SignupRequest {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SignupResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -- Requests --

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTabRequest {
    pub id: String,
    pub user: String,
    pub song: String,
    pub artist: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

// -- Replies --

/// Response to a reply upload. Mirrors the stored row minus the PDF bytes.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReplyCreated {
    pub id: String,
    pub request_id: String,
    pub username: String,
    pub comment: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub song: String,
    pub artist: String,
    pub date: DateTime<Utc>,
}

// -- Shared --

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
    pub error: String,
}
