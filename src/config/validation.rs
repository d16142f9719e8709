//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{EventBoardError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_stats_config(&settings.stats)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(EventBoardError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.port == 0 {
        return Err(EventBoardError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EventBoardError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(EventBoardError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventBoardError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate statistics service configuration
fn validate_stats_config(config: &super::StatsConfig) -> Result<()> {
    if let Some(ref endpoint) = config.endpoint {
        url::Url::parse(endpoint).map_err(|e| {
            EventBoardError::Config(format!("Invalid stats endpoint URL: {}", e))
        })?;
    }

    if config.app_name.is_empty() {
        return Err(EventBoardError::Config(
            "Stats application name is required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventBoardError::Config(
            "Logging level is required".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_invalid_stats_endpoint_rejected() {
        let mut settings = Settings::default();
        settings.stats.endpoint = Some("not a url".to_string());
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_connection_bounds_checked() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        settings.database.max_connections = 10;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(validate_settings(&settings).is_err());
    }
}
