//! Error types for routeforge

use http::StatusCode;
use routeforge_schema::{SchemaError, ValidationError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for request handling
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Error returned to HTTP clients.
///
/// Always rendered as `{"status": <code>, "message": <text>}`.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,
    /// Error type identifier, used in logs
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Internal details, logged but never sent to the client
    pub(crate) internal: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(
        status: StatusCode,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
            internal: None,
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// Create a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// Create a 413 Payload Too Large error
    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            format!("Request body exceeds limit of {} bytes", limit),
        )
    }

    /// Create a 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    /// Add internal details (for logging only)
    pub fn with_internal(mut self, details: impl Into<String>) -> Self {
        self.internal = Some(details.into());
        self
    }

    /// Internal details, if any
    pub fn internal_details(&self) -> Option<&str> {
        self.internal.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for ApiError {}

/// JSON body of an error response
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub status: u16,
    pub message: String,
}

impl From<&ApiError> for ErrorBody {
    fn from(err: &ApiError) -> Self {
        Self {
            status: err.status.as_u16(),
            message: err.message.clone(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", err.message)
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Invalid(err) => err.into(),
            err @ SchemaError::Check { .. } => {
                ApiError::internal("Request validation could not be completed")
                    .with_internal(err.to_string())
            }
        }
    }
}

/// Error raised while assembling an [`Api`](crate::Api) into an
/// [`App`](crate::App). Always fatal: the API definition must be fixed.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A builder's own options broke a rule.
    #[error("{builder} ({target}): {message}")]
    Invalid {
        /// Builder kind ("Api", "Version", "Group", "Route", "Endpoint")
        builder: &'static str,
        /// Name or path of the offending builder
        target: String,
        /// First failing rule
        message: String,
    },

    /// Two endpoints claim the same method and path, or the paths overlap.
    #[error("route conflict on {method} {path}: {details}")]
    Conflict {
        method: String,
        path: String,
        details: String,
    },

    /// A custom check on builder options failed to run.
    #[error("{builder} ({target}): {source}")]
    Check {
        builder: &'static str,
        target: String,
        #[source]
        source: SchemaError,
    },
}

impl BuildError {
    pub(crate) fn from_schema(builder: &'static str, target: &str, err: SchemaError) -> Self {
        match err {
            SchemaError::Invalid(err) => BuildError::Invalid {
                builder,
                target: target.to_string(),
                message: err.message,
            },
            source => BuildError::Check {
                builder,
                target: target.to_string(),
                source,
            },
        }
    }
}
