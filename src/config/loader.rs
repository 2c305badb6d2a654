//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    let config: RelayConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Apply a command-line listen address and validate the result again.
pub fn with_bind_override(
    mut config: RelayConfig,
    bind: Option<String>,
) -> Result<RelayConfig, ConfigError> {
    if let Some(bind) = bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/relay.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[listener\nbind_address = 1").unwrap_err();
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = parse_config("[transport]\nattempts = 9\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: transport.attempts: must be between 1 and 5"
        );
    }

    #[test]
    fn test_bind_override_is_validated() {
        let config =
            with_bind_override(RelayConfig::default(), Some("127.0.0.1:9999".into())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");

        let err = with_bind_override(RelayConfig::default(), Some("nowhere".into())).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref errors) if errors[0].field == "listener.bind_address"
        ));

        let config = with_bind_override(RelayConfig::default(), None).unwrap();
        assert_eq!(config.listener.bind_address, RelayConfig::default().listener.bind_address);
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join("hotspot_relay_loader_test.toml");
        fs::write(&path, "[settings]\nHostName = \"origin.example\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.settings["HostName"].to_string(), "origin.example");
        fs::remove_file(&path).unwrap_or_default();
    }
}
