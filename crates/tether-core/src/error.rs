//! Error types for tether.
//!
//! A single error type with explicit variants for transport failures,
//! non-success responses, terminal authentication failures, credential
//! storage, and input validation.

use std::fmt;
use thiserror::Error;

/// The unified error type for tether operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, body decoding).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-success status.
    #[error("request failed: {0}")]
    Status(#[from] StatusError),

    /// Terminal authentication errors. The session cannot be recovered
    /// without signing in again.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Credential storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors (base URL, method, header format).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if this is an authorization failure the refresh
    /// coordinator may recover from (HTTP 401 or an invalid-token code).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Status(status) if status.is_auth_failure())
    }

    /// Returns true if this is a terminal authentication error.
    pub fn is_terminal_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Returns the HTTP status for response errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status(status) => Some(status.status),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The response body could not be read or decoded.
    #[error("invalid response body: {message}")]
    Body { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-success HTTP response.
#[derive(Debug, Clone)]
pub struct StatusError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code from the body (if present).
    pub code: Option<String>,
    /// Human-readable message from the body (if present).
    pub message: Option<String>,
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for StatusError {}

impl StatusError {
    /// Create a new status error.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    /// Check if this is an authorization failure.
    pub fn is_auth_failure(&self) -> bool {
        self.status == 401 || self.code.as_deref() == Some("token_not_valid")
    }
}

/// Terminal authentication errors.
///
/// These are `Clone` so that one renewal outcome can be delivered to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The server rejected the login credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No refresh token is stored, so the access token cannot be renewed.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The request was rejected again after retrying with a renewed token.
    #[error("request rejected after token renewal")]
    RetryRejected,

    /// The renewal exchange failed; the session has been signed out.
    #[error("token renewal failed: {reason}")]
    RenewalFailed { reason: String },

    /// The session was ended (logout) while the request was waiting.
    #[error("session ended")]
    SessionEnded,
}

/// Credential storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing storage failed.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Stored credentials could not be parsed.
    #[error("corrupt credentials: {message}")]
    Corrupt { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Unknown HTTP method.
    #[error("invalid method '{value}'")]
    Method { value: String },

    /// Header name or value cannot be sent.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_status_is_auth_failure() {
        let err = Error::from(StatusError::new(401, None, None));
        assert!(err.is_auth_failure());
        assert!(!err.is_terminal_auth());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn invalid_token_code_is_auth_failure() {
        let err = StatusError::new(403, Some("token_not_valid".into()), None);
        assert!(err.is_auth_failure());
    }

    #[test]
    fn other_statuses_are_not_auth_failures() {
        assert!(!Error::from(StatusError::new(403, None, None)).is_auth_failure());
        assert!(!Error::from(StatusError::new(500, None, None)).is_auth_failure());
        assert!(
            !Error::from(TransportError::Connection {
                message: "refused".into()
            })
            .is_auth_failure()
        );
    }

    #[test]
    fn auth_errors_are_terminal() {
        assert!(Error::from(AuthError::RetryRejected).is_terminal_auth());
        assert!(!Error::from(AuthError::SessionEnded).is_auth_failure());
    }

    #[test]
    fn status_display_includes_code_and_message() {
        let err = StatusError::new(
            401,
            Some("token_not_valid".into()),
            Some("Token is expired".into()),
        );
        assert_eq!(err.to_string(), "HTTP 401 [token_not_valid]: Token is expired");
    }
}
