//! Unified application error types for Courtbook.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (slot already booked, duplicate team,
    /// illegal state transition, exhausted free quota).
    Conflict,
    /// The caller does not have permission to perform the action.
    Authorization,
    /// A loyalty debit would drive the balance negative.
    InsufficientPoints,
    /// The payment gateway call failed (transport or API error).
    Gateway,
    /// The gateway-reported amount does not match the expected amount.
    AmountMismatch,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal invariant was violated.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::InsufficientPoints => write!(f, "INSUFFICIENT_POINTS"),
            Self::Gateway => write!(f, "GATEWAY"),
            Self::AmountMismatch => write!(f, "AMOUNT_MISMATCH"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Courtbook.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary, so callers (controllers) can map each
/// kind deterministically to a user-facing response.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create an insufficient-points error.
    pub fn insufficient_points(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientPoints, message)
    }

    /// Create a gateway error.
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Gateway, message)
    }

    /// Create an amount-mismatch error.
    pub fn amount_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AmountMismatch, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::conflict("slot already booked");
        assert_eq!(err.to_string(), "CONFLICT: slot already booked");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::Internal, "wrapped", io);
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Internal);
        assert!(cloned.source.is_none());
    }
}
