//! Syntactic parsing of bootstrap config content.

use contracts::{BootstrapConfig, ProxyError};

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse config content without semantic checks.
pub(crate) fn parse(content: &str, format: ConfigFormat) -> Result<BootstrapConfig, ProxyError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| ProxyError::config_parse(format!("TOML parse error: {e}"))),
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| ProxyError::config_parse(format!("JSON parse error: {e}"))),
    }
}
