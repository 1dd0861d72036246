use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Library path is not empty
/// - Catalog timeout and rate limit are non-zero
/// - Remote port and timeout are non-zero when the remote client is enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.library.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "library.path is required".to_string(),
        ));
    }

    if config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.catalog.rate_limit_rpm == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.rate_limit_rpm cannot be 0".to_string(),
        ));
    }

    if config.remote.enabled {
        if config.remote.port == 0 {
            return Err(ConfigError::ValidationError(
                "remote.port cannot be 0".to_string(),
            ));
        }
        if config.remote.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "remote.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn base_config() -> Config {
        load_config_from_str(
            r#"
[library]
path = "library.db"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_library_path_fails() {
        let mut config = base_config();
        config.library.path = Default::default();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_missing_library_section_fails() {
        let config = load_config_from_str("restrict_album = true").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration validation failed: library.path is required"
        );
    }

    #[test]
    fn test_validate_zero_rate_limit_fails() {
        let mut config = base_config();
        config.catalog.rate_limit_rpm = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_remote_port_zero_only_when_enabled() {
        let mut config = base_config();
        config.remote.port = 0;
        assert!(validate_config(&config).is_ok());

        config.remote.enabled = true;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
