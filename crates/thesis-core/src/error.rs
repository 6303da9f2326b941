//! Error types for Thesis Desk.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole client.
///
/// Every failure a user action can run into maps onto one of these variants,
/// so callers can tell a stale stage (`Conflict`) apart from a bad credential
/// (`Authorization`) or an unreachable backend (`Transport`).
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ThesisError {
    /// A required field is missing or malformed, or a role/decision pairing is illegal.
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// Missing, invalid or insufficient credential.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Transition attempted from a stage other than the one it targets.
    #[error("Conflict: expected stage {expected}, record is in {actual}")]
    Conflict { expected: String, actual: String },

    /// Non-2xx response from the remote API.
    #[error("Transport error: {status} {text}")]
    Transport { status: u16, text: String },

    /// Gateway call exceeded the configured timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ThesisError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error for the given field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an Authorization error
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Creates a Conflict error from the stage the caller targeted and the actual one.
    pub fn conflict(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Conflict {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a Transport error from an HTTP status and its reason text.
    pub fn transport(status: u16, text: impl Into<String>) -> Self {
        Self::Transport {
            status,
            text: text.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Short, user-facing category used in notifications.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Authorization(_) => "authorization",
            Self::Conflict { .. } => "conflict",
            Self::Transport { .. } | Self::Timeout(_) => "transport",
            Self::NotFound { .. } => "not found",
            Self::Io { .. } | Self::Serialization { .. } | Self::Config(_) | Self::Internal(_) => {
                "internal"
            }
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ThesisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ThesisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ThesisError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ThesisError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ThesisError>`.
pub type Result<T> = std::result::Result<T, ThesisError>;
