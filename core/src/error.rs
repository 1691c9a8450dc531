//! Error types for the todo sync client.
//!
//! # Design
//! Errors come in two layers. `ApiError`, `StoreError` and `ConfigError`
//! describe what went wrong inside one component. `ClientError` is what the
//! session and todo operations hand to the presentation layer: a coarse
//! `ErrorKind`, the single message meant for the user, and the HTTP status
//! when there was one.

use std::io;

use thiserror::Error;

/// Message used when the server gives no explanation of a failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred";

/// Errors produced by `ApiClient` and `Transport` implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (unreachable host, broken
    /// connection, unreadable body).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Status { status: u16, message: Option<String> },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The server's message, or the generic fallback.
    pub fn user_message(&self) -> String {
        self.server_message()
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string()
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Status {
                status: 401 | 403, ..
            } => ErrorKind::Authentication,
            ApiError::Status { .. } => ErrorKind::Server,
            ApiError::Transport(_) | ApiError::Deserialization(_) | ApiError::Serialization(_) => {
                ErrorKind::Transport
            }
        }
    }
}

/// Errors from a `CredentialStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential storage failed: {0}")]
    Io(#[from] io::Error),

    /// No usable storage location could be determined.
    #[error("no storage directory available")]
    NoStorageDir,
}

/// Errors while loading `Config`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Category of a failed session or todo operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally before any network call.
    Validation,
    /// Missing, invalid or expired token (HTTP 401/403).
    Authentication,
    /// Network failure or a response that could not be read.
    Transport,
    /// Any other non-2xx answer from the server.
    Server,
    /// The credential store could not be read or written.
    Storage,
}

/// Failure of a session or todo operation, as seen by the presentation
/// layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ClientError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            status: None,
        }
    }

    /// Keep the classification of `err` but report `message` to the user.
    pub fn from_api(err: &ApiError, message: impl Into<String>) -> Self {
        Self {
            kind: err.kind(),
            message: message.into(),
            status: err.status(),
        }
    }

    pub fn storage(err: &StoreError) -> Self {
        Self {
            kind: ErrorKind::Storage,
            message: err.to_string(),
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_authentication() {
        let err = ApiError::Status {
            status: 401,
            message: Some("No token provided".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn not_found_is_server() {
        let err = ApiError::Status {
            status: 404,
            message: None,
        };
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn malformed_body_is_transport() {
        let err = ApiError::Deserialization("expected value".to_string());
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn user_message_falls_back_to_generic() {
        let err = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.to_string(), "HTTP 500: An error occurred");
    }

    #[test]
    fn user_message_prefers_server_text() {
        let err = ApiError::Status {
            status: 400,
            message: Some("Username already exists".to_string()),
        };
        assert_eq!(err.user_message(), "Username already exists");
    }

    #[test]
    fn from_api_keeps_classification() {
        let err = ApiError::Status {
            status: 403,
            message: Some("Invalid token".to_string()),
        };
        let client = ClientError::from_api(&err, "Failed to add todo");
        assert_eq!(client.kind, ErrorKind::Authentication);
        assert_eq!(client.status, Some(403));
        assert_eq!(client.to_string(), "Failed to add todo");
    }
}
