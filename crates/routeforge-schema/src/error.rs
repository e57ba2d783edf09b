//! Error types for schema validation.

use crate::check::CheckError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The first rule a data object violated.
///
/// Validation is fail-fast: a single `ValidationError` describes the first
/// failing field, never an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed (`tags[2]` for array elements)
    pub field: String,
    /// Rule code (e.g. "required", "type", "range", "email", "check")
    pub code: String,
    /// Human-readable sentence, e.g. `The field "name" has not been provided.`
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Build the standard `The field "<field>" <rule>.` sentence.
    pub(crate) fn rule(field: &str, code: &str, rule: impl fmt::Display) -> Self {
        Self::new(field, code, format!("The field \"{field}\" {rule}."))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Error returned by [`Schema::validate`](crate::Schema::validate).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The data broke a rule. Callers usually report this back to the client.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A custom check could not produce a verdict.
    #[error("check on field \"{field}\" failed to run: {source}")]
    Check {
        /// Field the check was attached to
        field: String,
        /// Error raised by the check
        #[source]
        source: CheckError,
    },
}

impl SchemaError {
    /// The rule violation, if this error is one.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            SchemaError::Invalid(err) => Some(err),
            SchemaError::Check { .. } => None,
        }
    }

    /// Returns `true` when the data itself was at fault.
    pub fn is_invalid(&self) -> bool {
        matches!(self, SchemaError::Invalid(_))
    }
}
