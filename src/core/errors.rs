//! Custom error types for translation operations

use std::fmt;

use thiserror::Error;

/// Pipeline stage an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    /// Language codes rejected before any network call
    Validation,
    /// Client could not be constructed
    Construction,
    /// Signing key pair could not be fetched or parsed
    KeyAcquisition,
    /// HTTP call failed
    Transport,
    /// Response body did not match the expected shape
    Decode,
    /// Configuration could not be loaded or is invalid
    Config,
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorStage::Validation => "validation",
            ErrorStage::Construction => "construction",
            ErrorStage::KeyAcquisition => "key-acquisition",
            ErrorStage::Transport => "transport",
            ErrorStage::Decode => "decode",
            ErrorStage::Config => "config",
        };
        f.write_str(name)
    }
}

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Source language is neither `auto` nor in the catalog
    #[error("Unsupported source language: {code}")]
    UnsupportedSourceLanguage {
        /// Language code as given
        code: String,
    },

    /// Target language is not in the catalog
    #[error("Unsupported target language: {code}")]
    UnsupportedTargetLanguage {
        /// Language code as given
        code: String,
    },

    /// Server address is not one of the known endpoint hosts
    #[error("Unsupported server address: {address}")]
    UnsupportedAddress {
        /// Address as given
        address: String,
    },

    /// Signing key pair could not be obtained
    #[error("Key acquisition failed for {server}: {message}")]
    KeyAcquisition {
        /// Host or URL the call targeted
        server: String,
        /// Underlying failure
        message: String,
    },

    /// HTTP call failed or returned a non-success status
    #[error("Transport error for {server}: {}{message}", status_prefix(.status))]
    Transport {
        /// Host or URL the call targeted
        server: String,
        /// HTTP status, when a response arrived
        status: Option<u16>,
        /// Underlying failure
        message: String,
    },

    /// Response body could not be decoded
    #[error("Decode error for {server}: {message}")]
    Decode {
        /// Host or URL the call targeted
        server: String,
        /// Underlying failure
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Underlying failure
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TranslationError {
    /// Stage of the pipeline that produced this error
    pub fn stage(&self) -> ErrorStage {
        match self {
            TranslationError::UnsupportedSourceLanguage { .. }
            | TranslationError::UnsupportedTargetLanguage { .. } => ErrorStage::Validation,
            TranslationError::UnsupportedAddress { .. } => ErrorStage::Construction,
            TranslationError::KeyAcquisition { .. } => ErrorStage::KeyAcquisition,
            TranslationError::Transport { .. } => ErrorStage::Transport,
            TranslationError::Decode { .. } => ErrorStage::Decode,
            TranslationError::Config { .. }
            | TranslationError::Io(_)
            | TranslationError::Json(_)
            | TranslationError::Yaml(_) => ErrorStage::Config,
        }
    }

    /// Server address the failing call was made against, if any
    pub fn server(&self) -> Option<&str> {
        match self {
            TranslationError::KeyAcquisition { server, .. }
            | TranslationError::Transport { server, .. }
            | TranslationError::Decode { server, .. } => Some(server),
            TranslationError::UnsupportedAddress { address } => Some(address),
            _ => None,
        }
    }
}

fn status_prefix(status: &Option<u16>) -> String {
    status.map(|s| format!("{} - ", s)).unwrap_or_default()
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_message_includes_status() {
        let err = TranslationError::Transport {
            server: "https://translate.google.com".to_string(),
            status: Some(429),
            message: "Too Many Requests".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Transport error for https://translate.google.com: 429 - Too Many Requests"
        );
        assert_eq!(err.stage(), ErrorStage::Transport);
        assert_eq!(err.server(), Some("https://translate.google.com"));
    }

    #[test]
    fn test_transport_message_without_status() {
        let err = TranslationError::Transport {
            server: "http://translate.google.cn".to_string(),
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Transport error for http://translate.google.cn: connection refused"
        );
    }

    #[test]
    fn test_validation_stage() {
        let err = TranslationError::UnsupportedTargetLanguage { code: "xx".to_string() };
        assert_eq!(err.stage(), ErrorStage::Validation);
        assert_eq!(err.server(), None);
    }
}
