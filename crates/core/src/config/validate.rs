use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Command prefix and continuation keyword are not empty
/// - Search timeout and observed-message cap are not 0
/// - Import file and its archive differ
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.commands.prefix.is_empty() {
        return Err(ConfigError::ValidationError(
            "commands.prefix cannot be empty".to_string(),
        ));
    }

    if config.search.continuation_keyword.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "search.continuation_keyword cannot be empty".to_string(),
        ));
    }

    if config.search.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "search.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.search.max_observed_messages == 0 {
        return Err(ConfigError::ValidationError(
            "search.max_observed_messages cannot be 0".to_string(),
        ));
    }

    if config.sounds.import_file == config.sounds.import_archive {
        return Err(ConfigError::ValidationError(
            "sounds.import_archive must differ from sounds.import_file".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_empty_prefix_fails() {
        let mut config = Config::default();
        config.commands.prefix = String::new();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_blank_keyword_fails() {
        let mut config = Config::default();
        config.search.continuation_keyword = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.search.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_cap_fails() {
        let mut config = Config::default();
        config.search.max_observed_messages = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_archive_same_as_import_fails() {
        let mut config = Config::default();
        config.sounds.import_archive = config.sounds.import_file.clone();
        assert!(validate_config(&config).is_err());
    }
}
