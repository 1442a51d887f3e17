//! Error types for the Meraki provider and its Dashboard client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned by a single Dashboard API call.
///
/// The retry wrapper forwards these untouched; only [`ApiError::status`]
/// is consulted to decide whether another attempt is made.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The Dashboard answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// The raw response body, kept for diagnostics.
        body: String,
    },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A request header could not be built.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

#[derive(Debug, Deserialize)]
struct DashboardErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

impl ApiError {
    /// The HTTP status carried by this error, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Decode(_) | Self::InvalidUrl(_) | Self::InvalidHeader(_) => None,
        }
    }

    /// The `errors` list from a Dashboard error body (`{"errors": [...]}`).
    ///
    /// Returns an empty list when the body is absent or has another shape.
    pub fn dashboard_errors(&self) -> Vec<String> {
        match self {
            Self::Status { body, .. } => serde_json::from_str::<DashboardErrorBody>(body)
                .map(|b| b.errors)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Whether the transport gave up waiting for the Dashboard.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}

/// Errors that can occur while serving provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal provider error occurred.
    #[error("SDK error: {0}")]
    Sdk(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource already exists (create conflict).
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Permission denied (authentication/authorization failure).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Quota or rate limit exceeded.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Service temporarily unavailable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Operation timed out.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Operation failed due to current state (precondition not met).
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    /// Operation not implemented.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// Invalid request from client.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The Dashboard API failed in a way no other variant describes.
    #[error("Dashboard API error: {0}")]
    Api(String),
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Sdk(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg)
            | Self::AlreadyExists(msg)
            | Self::PermissionDenied(msg)
            | Self::ResourceExhausted(msg)
            | Self::Unavailable(msg)
            | Self::DeadlineExceeded(msg)
            | Self::FailedPrecondition(msg)
            | Self::Unimplemented(msg)
            | Self::InvalidRequest(msg)
            | Self::Api(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
        }
    }

    /// Turn a failed Dashboard call into a provider error.
    ///
    /// `operation` names what was attempted (e.g. "Failure when executing
    /// UpdateNetwork"). The message carries the status and every string of
    /// the Dashboard `errors` list so the user sees why the call failed.
    pub fn from_api(operation: &str, err: ApiError) -> Self {
        let status = err.status();
        let errors = err.dashboard_errors();
        let detail = if !errors.is_empty() {
            errors.join("; ")
        } else {
            match &err {
                ApiError::Status { body, .. } if !body.trim().is_empty() => body.clone(),
                other => other.to_string(),
            }
        };
        let msg = match status {
            Some(code) => format!("{}: HTTP {}: {}", operation, code.as_u16(), detail),
            None => format!("{}: {}", operation, detail),
        };

        if err.is_timeout() {
            return Self::DeadlineExceeded(msg);
        }
        match status.map(|s| s.as_u16()) {
            Some(404) => Self::NotFound(msg),
            Some(401) | Some(403) => Self::PermissionDenied(msg),
            Some(409) => Self::AlreadyExists(msg),
            Some(429) => Self::ResourceExhausted(msg),
            Some(400) | Some(422) => Self::InvalidRequest(msg),
            Some(503) => Self::Unavailable(msg),
            Some(504) => Self::DeadlineExceeded(msg),
            _ => Self::Api(msg),
        }
    }
}
