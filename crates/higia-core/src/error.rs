//! Error types for the Higia client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Higia client.
///
/// Variants follow the failure taxonomy the screens react to: local
/// validation, authentication loss, transport failures and backend
/// rejections. Everything else is an ambient failure of the client itself.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HigiaError {
    /// Local validation failed; no request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend answered 401. Local token and user were cleared.
    #[error("Authentication failed{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Auth { message: Option<String> },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not reach the backend.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend rejected the request with a non-401 error status.
    #[error("Backend error ({status}){}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Backend { status: u16, message: Option<String> },

    /// The workflow was asked to do something its current state forbids.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Local key-value storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HigiaError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
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

    /// Check if this is a local validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the backend rejected our credentials
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Check if the request never produced a backend response
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_))
    }

    /// Returns the text to show the user for this error.
    ///
    /// Messages the backend sent are shown verbatim, as are local validation
    /// and state messages. Everything else (transport failures, storage
    /// problems, backend errors without a message) falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) | Self::InvalidState(message) => message.clone(),
            Self::Auth {
                message: Some(message),
            }
            | Self::Backend {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for HigiaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for HigiaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HigiaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for HigiaError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, HigiaError>`.
pub type Result<T> = std::result::Result<T, HigiaError>;

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "Erro ao iniciar higienização";

    #[test]
    fn test_backend_message_is_shown_verbatim() {
        let err = HigiaError::Backend {
            status: 409,
            message: Some("Setor já possui higienização em andamento".to_string()),
        };
        assert_eq!(
            err.user_message(FALLBACK),
            "Setor já possui higienização em andamento"
        );
    }

    #[test]
    fn test_backend_without_message_uses_fallback() {
        let err = HigiaError::Backend {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(FALLBACK), FALLBACK);
    }

    #[test]
    fn test_transport_errors_use_fallback() {
        assert_eq!(HigiaError::Timeout.user_message(FALLBACK), FALLBACK);
        assert_eq!(
            HigiaError::Network("connection refused".into()).user_message(FALLBACK),
            FALLBACK
        );
        assert!(HigiaError::Timeout.is_transport());
    }

    #[test]
    fn test_validation_message_is_shown() {
        let err = HigiaError::validation("Preencha todos os campos");
        assert!(err.is_validation());
        assert_eq!(err.user_message(FALLBACK), "Preencha todos os campos");
    }

    #[test]
    fn test_display_formats() {
        let auth = HigiaError::Auth { message: None };
        assert_eq!(auth.to_string(), "Authentication failed");

        let backend = HigiaError::Backend {
            status: 404,
            message: Some("Setor não encontrado".into()),
        };
        assert_eq!(backend.to_string(), "Backend error (404): Setor não encontrado");
    }

    #[test]
    fn test_from_json_error() {
        let err: HigiaError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, HigiaError::Serialization { ref format, .. } if format == "JSON"));
    }
}
