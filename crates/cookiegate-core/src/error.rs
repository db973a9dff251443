//! Unified application error types for Cookiegate.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A composition-time precondition was violated (e.g. no data protection
    /// provider could be bound). Never produced while handling a request.
    FatalConfiguration,
    /// A protected ticket could not be decoded, verified, or deserialized.
    InvalidTicket,
    /// A configuration file or key material could not be loaded.
    Configuration,
    /// A serialization error occurred while producing a payload.
    Serialization,
    /// A local I/O error occurred.
    Storage,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FatalConfiguration => write!(f, "FATAL_CONFIGURATION"),
            Self::InvalidTicket => write!(f, "INVALID_TICKET"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Cookiegate.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
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

    /// Create a fatal configuration error.
    pub fn fatal_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FatalConfiguration, message)
    }

    /// Create an invalid-ticket error.
    pub fn invalid_ticket(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidTicket, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether the caller may continue as if no authentication was present.
    ///
    /// Only [`ErrorKind::InvalidTicket`] is recoverable.
    pub fn is_recoverable(&self) -> bool {
        self.kind == ErrorKind::InvalidTicket
    }

    /// Whether this is a fatal composition-time error.
    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::FatalConfiguration
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

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
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
    fn test_only_invalid_ticket_is_recoverable() {
        assert!(AppError::invalid_ticket("bad mac").is_recoverable());
        assert!(!AppError::fatal_configuration("no provider").is_recoverable());
        assert!(!AppError::configuration("bad key").is_recoverable());
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::fatal_configuration("DataProtectionProvider must be provided");
        assert_eq!(
            err.to_string(),
            "FATAL_CONFIGURATION: DataProtectionProvider must be provided"
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = AppError::from(io);
        assert!(err.source.is_some());
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Storage);
        assert!(cloned.source.is_none());
    }
}
