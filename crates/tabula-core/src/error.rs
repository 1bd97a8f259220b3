//! Error types for the Tabula store.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for every store operation.
///
/// Store methods never panic on bad input or a failing substrate; every
/// failure is reported through one of these variants so the presentation
/// layer can render it without unwinding.
#[derive(Error, Debug, Clone, Serialize, PartialEq, Eq)]
pub enum TabulaError {
    /// Referenced project, tab or snapshot does not exist
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Operation is not valid for the entity's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The underlying blob store rejected a read or write (quota, lock, ...)
    #[error("Backing store failure: {0}")]
    BackingStore(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TabulaError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates a BackingStore error
    pub fn backing_store(message: impl Into<String>) -> Self {
        Self::BackingStore(message.into())
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

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// True when the failure came from the substrate rather than from the
    /// caller's request: quota, locking, disk or (de)serialization problems.
    pub fn is_backing_store_failure(&self) -> bool {
        matches!(
            self,
            Self::BackingStore(_) | Self::Io { .. } | Self::Serialization { .. }
        )
    }

    /// Short machine-readable name of the variant, used in response envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidState(_) => "invalid_state",
            Self::BackingStore(_) => "backing_store",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TabulaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TabulaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TabulaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TabulaError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for TabulaError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, TabulaError>`.
pub type Result<T> = std::result::Result<T, TabulaError>;
