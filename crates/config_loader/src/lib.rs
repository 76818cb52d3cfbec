//! # Config Loader
//!
//! Loading and validation of the proxy's bootstrap configuration.
//!
//! Responsibilities:
//! - Parse TOML/JSON config files into [`BootstrapConfig`]
//! - Validate semantic constraints (names, ports, addresses)
//!
//! Syntactic errors surface as `ConfigParse`, semantic ones as
//! `ConfigValidation` / `InvalidAddress`.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("proxy.toml")).unwrap();
//! println!("static services: {}", config.services.len());
//! ```

mod parser;
mod validator;

pub use contracts::BootstrapConfig;
pub use parser::ConfigFormat;

use std::path::Path;

use contracts::ProxyError;

/// Bootstrap config loader.
///
/// Static methods for loading from a file or a string.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a config file, detecting the format from its extension.
    ///
    /// # Errors
    /// - unreadable file
    /// - unsupported extension
    /// - parse failure
    /// - validation failure
    pub fn load_from_path(path: &Path) -> Result<BootstrapConfig, ProxyError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load config content in the given format.
    ///
    /// # Errors
    /// - parse failure
    /// - validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<BootstrapConfig, ProxyError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize a config to a TOML string.
    pub fn to_toml(config: &BootstrapConfig) -> Result<String, ProxyError> {
        toml::to_string_pretty(config)
            .map_err(|e| ProxyError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a config to a JSON string.
    pub fn to_json(config: &BootstrapConfig) -> Result<String, ProxyError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ProxyError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Infer the config format from the file extension.
    fn detect_format(path: &Path) -> Result<ConfigFormat, ProxyError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ProxyError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| ProxyError::config_parse(format!("unsupported config format: .{ext}")))
    }
}
