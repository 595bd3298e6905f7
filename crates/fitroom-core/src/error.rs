//! Error types for the FitRoom application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire FitRoom application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. The variants mirror the
/// failure taxonomy of the synthesis pipeline: media validation, provider
/// failures, transport failures, and internal sequencing defects.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FitroomError {
    /// Input bytes are not a supported image type.
    #[error("Unsupported media type: {mime}")]
    UnsupportedMedia { mime: String },

    /// Provider-side failure (non-success API response).
    #[error("Remote service error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    RemoteService {
        status: Option<u16>,
        message: String,
    },

    /// Transport-level failure (connect, timeout, DNS).
    #[error("Network error: {0}")]
    Network(String),

    /// Internal precondition violated. Indicates a sequencing defect in the
    /// caller, not a user-recoverable condition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "base64", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FitroomError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an UnsupportedMedia error
    pub fn unsupported_media(mime: impl Into<String>) -> Self {
        Self::UnsupportedMedia { mime: mime.into() }
    }

    /// Creates a RemoteService error
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RemoteService {
            status,
            message: message.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
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

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an UnsupportedMedia error
    pub fn is_unsupported_media(&self) -> bool {
        matches!(self, Self::UnsupportedMedia { .. })
    }

    /// Check if this is a RemoteService error
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteService { .. })
    }

    /// Check if this is a Network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Check if this is an InvalidState error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Renders a short human-readable message for the session error slot.
    ///
    /// `context` names the action that failed ("Failed to create model",
    /// "Failed to apply Denim Jacket", ...). Provider quota responses get a
    /// specific hint because they are the most common failure users hit.
    pub fn friendly_message(&self, context: &str) -> String {
        match self {
            Self::UnsupportedMedia { mime } => {
                format!("{context}: '{mime}' is not a supported image type. Please use a photo (JPEG, PNG or WebP).")
            }
            Self::RemoteService { status: Some(429), .. } => {
                format!("{context}: the image service is rate-limiting requests. Check your plan and billing, or wait a moment and try again.")
            }
            Self::RemoteService { message, .. } => format!("{context}: {message}"),
            Self::Network(message) => {
                format!("{context}: could not reach the image service ({message}). Check your connection and try again.")
            }
            // Sequencing defects are logged, not explained to the user.
            Self::InvalidState(_) => format!("{context}: an internal error occurred. Please try again."),
            other => format!("{context}: {other}"),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FitroomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FitroomError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FitroomError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<base64::DecodeError> for FitroomError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Serialization {
            format: "base64".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for FitroomError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Network(err.to_string())
        } else {
            Self::RemoteService {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

/// A type alias for `Result<T, FitroomError>`.
pub type Result<T> = std::result::Result<T, FitroomError>;
