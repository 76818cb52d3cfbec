//! Semantic validation of a parsed bootstrap config.

use std::collections::HashSet;

use contracts::{BootstrapConfig, ProxyError};

/// Check semantic constraints serde cannot express.
pub(crate) fn validate(config: &BootstrapConfig) -> Result<(), ProxyError> {
    if config.pipeline.channel_capacity == 0 {
        return Err(ProxyError::config_validation(
            "pipeline.channel_capacity",
            "must be greater than zero",
        ));
    }

    let mut service_names = HashSet::new();
    for service in &config.services {
        if service.name.is_empty() {
            return Err(ProxyError::config_validation("services.name", "must not be empty"));
        }
        if service.port == 0 {
            return Err(ProxyError::config_validation(
                format!("services.{}.port", service.name),
                "must be a non-zero port",
            ));
        }
        if !service_names.insert(service.name.as_str()) {
            return Err(ProxyError::config_validation(
                "services",
                format!("duplicate service name '{}'", service.name),
            ));
        }
    }

    let mut endpoints_names = HashSet::new();
    for endpoints in &config.endpoints {
        if endpoints.name.is_empty() {
            return Err(ProxyError::config_validation("endpoints.name", "must not be empty"));
        }
        if !endpoints_names.insert(endpoints.name.as_str()) {
            return Err(ProxyError::config_validation(
                "endpoints",
                format!("duplicate endpoints name '{}'", endpoints.name),
            ));
        }
        for address in &endpoints.addresses {
            validate_address(&endpoints.name, address)?;
        }
    }

    Ok(())
}

/// A backend address must be `host:port` with a non-zero numeric port.
fn validate_address(name: &str, address: &str) -> Result<(), ProxyError> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| ProxyError::invalid_address(name, address, "missing ':' separator"))?;

    if host.is_empty() {
        return Err(ProxyError::invalid_address(name, address, "empty host"));
    }

    match port.parse::<u16>() {
        Ok(0) => Err(ProxyError::invalid_address(name, address, "port must be non-zero")),
        Ok(_) => Ok(()),
        Err(_) => Err(ProxyError::invalid_address(
            name,
            address,
            format!("invalid port '{port}'"),
        )),
    }
}
