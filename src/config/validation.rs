//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use std::net::SocketAddr;
use crate::utils::errors::{KarmaHubError, Result};
use super::Settings;

const MIN_JWT_SECRET_LEN: usize = 32;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_auth_config(&settings.auth)?;
    validate_ai_config(&settings.ai)?;
    validate_storage_config(&settings.storage)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    config.bind_addr.parse::<SocketAddr>().map_err(|e| {
        KarmaHubError::Config(format!("Invalid bind address '{}': {}", config.bind_addr, e))
    })?;

    if config.request_body_limit_bytes == 0 {
        return Err(KarmaHubError::Config(
            "Request body limit must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(KarmaHubError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(KarmaHubError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(KarmaHubError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(KarmaHubError::Config(
            "Redis URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate authentication configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_JWT_SECRET_LEN {
        return Err(KarmaHubError::Config(
            format!("JWT secret must be at least {} bytes", MIN_JWT_SECRET_LEN)
        ));
    }

    if config.token_ttl_seconds == 0 {
        return Err(KarmaHubError::Config(
            "Token lifetime must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate AI gateway configuration
fn validate_ai_config(config: &super::AiConfig) -> Result<()> {
    url::Url::parse(&config.api_url)
        .map_err(|e| KarmaHubError::Config(format!("Invalid AI API URL: {}", e)))?;

    if config.model.is_empty() {
        return Err(KarmaHubError::Config(
            "AI model is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(KarmaHubError::Config(
            "AI timeout must be greater than 0".to_string()
        ));
    }

    if config.requests_per_minute == 0 {
        return Err(KarmaHubError::Config(
            "AI requests per minute must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    if config.root_dir.is_empty() {
        return Err(KarmaHubError::Config(
            "Storage root directory is required".to_string()
        ));
    }

    url::Url::parse(&config.public_base_url)
        .map_err(|e| KarmaHubError::Config(format!("Invalid storage public URL: {}", e)))?;

    if config.max_upload_bytes == 0 {
        return Err(KarmaHubError::Config(
            "Max upload size must be greater than 0".to_string()
        ));
    }

    if config.allowed_extensions.is_empty() {
        return Err(KarmaHubError::Config(
            "At least one allowed upload extension is required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(KarmaHubError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(KarmaHubError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
