//! Request/Response DTOs

use notekeep_db::UserProfile;
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Register request
///
/// Fields are optional here so a missing field becomes a 400 with our own
/// message instead of a deserializer error.
#[derive(Deserialize, Default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Deserialize, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register/login response
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

// ==================== Note Types ====================

/// Tags as sent by clients: either a JSON array or one comma-separated string
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl TagsInput {
    /// Trim every tag and drop empty ones, preserving order
    pub fn normalize(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            TagsInput::List(tags) => tags,
            TagsInput::Text(text) => text.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Create note request
#[derive(Deserialize, Default)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
}

/// Update note request; absent fields are left unchanged
#[derive(Deserialize, Default)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
}

/// List notes query parameters
///
/// Kept as raw strings: unparsable numbers fall back to defaults rather than
/// rejecting the request.
#[derive(Deserialize, Default, Debug)]
pub struct ListNotesParams {
    pub tag: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Trimmed value, or `None` if absent or blank
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Plain confirmation message
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}
