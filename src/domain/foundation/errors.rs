//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
///
/// Stable string codes for API responses and structured log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    OutOfRange,
    InvalidFormat,

    // Turn-fatal errors (the only two that escape the orchestrator)
    ParseFailure,
    GenerationFailure,

    // Recoverable degradations (recorded, never surfaced as errors)
    RetrievalDegraded,
    RetrievalUnavailable,
    EnrichmentAbsent,

    // State errors
    InvalidStateTransition,
    SessionNotFound,

    // Infrastructure errors
    StorageError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::ParseFailure => "PARSE_FAILURE",
            ErrorCode::GenerationFailure => "GENERATION_FAILURE",
            ErrorCode::RetrievalDegraded => "RETRIEVAL_DEGRADED",
            ErrorCode::RetrievalUnavailable => "RETRIEVAL_UNAVAILABLE",
            ErrorCode::EnrichmentAbsent => "ENRICHMENT_ABSENT",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_messages_name_the_field() {
        let err = ValidationError::empty_field("destination");
        assert!(err.to_string().contains("destination"));

        let err = ValidationError::out_of_range("alpha", 0.0, 1.0, 1.5);
        assert!(err.to_string().contains("alpha"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn error_codes_render_screaming_snake() {
        assert_eq!(ErrorCode::ParseFailure.to_string(), "PARSE_FAILURE");
        assert_eq!(
            ErrorCode::RetrievalUnavailable.to_string(),
            "RETRIEVAL_UNAVAILABLE"
        );
    }
}
