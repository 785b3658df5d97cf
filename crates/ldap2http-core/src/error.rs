//! Error types for gateway operations.
//!
//! This module provides the error hierarchy shared by the gateway crates, including the
//! conversions from the HTTP client, URL and JSON libraries used to talk to the backend.

use thiserror::Error;

/// Main error type for gateway operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The bind DN or password did not match the configured identity
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Backend answered with a non-success status
    #[error("Backend returned status {status}: {message}")]
    BackendStatus {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Backend could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Backend body was not a JSON array of objects
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    /// Operation timed out
    #[error("Timeout waiting for backend: {0}")]
    Timeout(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The LDAP listener could not bind or accept
    #[error("Listener failure: {0}")]
    ListenerError(String),
}

/// Specialized result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::BackendStatus { .. } => "BACKEND_STATUS",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::Timeout(_) => "TIMEOUT",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::ListenerError(_) => "LISTENER_ERROR",
        }
    }

    /// Returns the backend HTTP status carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::BackendStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        match self {
            Self::BackendStatus { status, .. } => *status >= 500,
            Self::ServiceUnavailable(_)
            | Self::MalformedResponse(_)
            | Self::Timeout(_)
            | Self::HttpError(_)
            | Self::ConfigError(_)
            | Self::ListenerError(_) => true,
            _ => false,
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::BackendStatus {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
