//! Authentication endpoint paths and request/response bodies.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Exchanges email and password for a credential pair.
pub const LOGIN: &str = "auth/login/";

/// Creates an account.
pub const SIGNUP: &str = "auth/signup/";

/// Exchanges a refresh token for a new credential pair.
pub const REFRESH: &str = "auth/refresh/";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login and signup.
#[derive(Debug, Serialize)]
pub struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for token renewal.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Tokens returned by login and renewal.
///
/// Renewal omits `refresh` unless the server rotates refresh tokens.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Error response body.
///
/// Accepts both `{"detail", "code"}` and `{"error", "message"}` shapes.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, alias = "error")]
    pub code: Option<String>,
    #[serde(default, alias = "message")]
    pub detail: Option<String>,
}
