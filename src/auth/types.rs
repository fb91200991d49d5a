// Authentication types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user's profile as known to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub gender: String,
    pub address: String,
}

/// Partial update of the mutable profile fields
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Response to login and registration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Identity,
    pub refresh_token: Option<String>,
}

/// Refresh exchange request body
#[derive(Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh exchange response
#[derive(Deserialize)]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

/// Result of a refresh-credential exchange.
///
/// `NoSession` and `Failed` are both terminal for the transport, but callers
/// can tell a never-authenticated session from a failed exchange
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// A new access credential was issued and persisted
    Refreshed(String),

    /// No refresh credential is persisted; nothing to exchange
    NoSession,

    /// The exchange was attempted and did not produce a credential
    Failed(String),
}

/// Instruction for a route loader to redirect before rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub location: String,
    pub status: u16,
}
