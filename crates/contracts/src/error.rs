//! Error definitions, layered by origin: config / entity / io.

use thiserror::Error;

/// Unified error type for the configuration plane.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Malformed backend address on an endpoints record
    #[error("invalid address '{address}' for endpoints '{name}': {message}")]
    InvalidAddress {
        name: String,
        address: String,
        message: String,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProxyError {
    /// Create a config parse error.
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config validation error.
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid address error.
    pub fn invalid_address(
        name: impl Into<String>,
        address: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAddress {
            name: name.into(),
            address: address.into(),
            message: message.into(),
        }
    }
}
