//! Error types for the matching engine.

use std::time::Duration;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, MatchingError>;

/// Errors that abort a matching request.
///
/// A slot with no eligible shot or a shot pair with no transition data is
/// not an error; those are skipped and surface as quality issues.
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("No segment configuration loaded")]
    ConfigMissing,

    #[error("Invalid configuration at '{key}': {message}")]
    Configuration { key: String, message: String },

    #[error("Matching timed out after {0:?}")]
    MatchingTimeout(Duration),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Matching task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),
}

impl MatchingError {
    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Offending configuration key, if this is a configuration error.
    pub fn config_key(&self) -> Option<&str> {
        match self {
            MatchingError::Configuration { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Check if this error comes from bad configuration rather than bad input.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            MatchingError::ConfigMissing
                | MatchingError::Configuration { .. }
                | MatchingError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_key() {
        let err = MatchingError::configuration("segments.hook.weights", "weights sum to 1.2");
        assert_eq!(err.config_key(), Some("segments.hook.weights"));
        assert!(err.is_config_error());
        assert!(err.to_string().contains("segments.hook.weights"));
    }

    #[test]
    fn test_timeout_is_not_config_error() {
        let err = MatchingError::MatchingTimeout(Duration::from_millis(0));
        assert!(!err.is_config_error());
        assert_eq!(err.config_key(), None);
    }
}
