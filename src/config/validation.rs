//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts bounded, addresses parse)
//! - Warn about area definitions the resolver will skip
//! - Warn when no origin host is configured
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Malformed areas are warnings: the resolver skips them at request time

use std::net::SocketAddr;

use crate::config::schema::RelayConfig;
use crate::routing::area::{parse_bounds, AREA_LIMIT};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a configuration before it is accepted.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }
    if !matches!(config.observability.log_format.as_str(), "pretty" | "compact") {
        errors.push(ValidationError::new(
            "observability.log_format",
            "must be \"pretty\" or \"compact\"",
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.transport.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "transport.connect_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.transport.read_timeout_secs == 0 {
        errors.push(ValidationError::new("transport.read_timeout_secs", "must be greater than 0"));
    }
    if !(1..=5).contains(&config.transport.attempts) {
        errors.push(ValidationError::new("transport.attempts", "must be between 1 and 5"));
    }

    let clients = &config.clients;
    for (field, value) in [
        ("clients.directory_layer", &clients.directory_layer),
        ("clients.image_trigger_client", &clients.image_trigger_client),
        ("clients.image_trigger_directory_layer", &clients.image_trigger_directory_layer),
        ("clients.slam_client", &clients.slam_client),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    if !config
        .settings
        .get("HostName")
        .is_some_and(|host| !host.to_string().trim().is_empty())
    {
        tracing::warn!("settings.HostName is not set, requests fail until an area provides it");
    }

    for index in 1..=AREA_LIMIT {
        let key = format!("Area_{}", index);
        let Some(value) = config.settings.get(&key) else {
            break;
        };
        if parse_bounds(&value.to_string()).is_none() {
            tracing::warn!(area = %key, value = %value, "Area needs four integer bounds, it will be skipped");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.transport.attempts = 0;
        config.transport.read_timeout_secs = 0;
        config.clients.slam_client = " ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.field == "transport.attempts"));
        assert!(errors[0].to_string().starts_with("listener.bind_address:"));
    }

    #[test]
    fn test_malformed_area_is_not_an_error() {
        let config: RelayConfig = toml::from_str(
            r#"
            [settings]
            Area_1 = "1,2,3"
            "#,
        )
        .unwrap();
        assert!(validate_config(&config).is_ok());
    }
}
