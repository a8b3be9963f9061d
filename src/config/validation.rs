use crate::config::types::{Config, RequestConfig, ScanConfig, TargetConfig};
use crate::crawler::Level;
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_scan_config(&config.scan)?;
    validate_request_config(&config.request)?;
    Ok(())
}

/// Validates the gather target
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    validate_domain(&config.domain)?;

    let url = Url::parse(&config.root_page).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid root-page '{}': {}", config.root_page, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "root-page '{}' must use http or https",
            config.root_page
        )));
    }

    validate_level("parent-level", &config.parent_level)
}

/// Validates scan settings
fn validate_scan_config(config: &ScanConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 512 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and 512, got {}",
            config.max_concurrent_requests
        )));
    }

    for level in &config.levels {
        validate_level("scan level", level)?;
    }

    Ok(())
}

/// Validates outbound header overrides
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    if let Some(user_agent) = &config.user_agent {
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent cannot be empty".to_string(),
            ));
        }
    }

    for (name, value) in &config.headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid header name '{}'", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
        if name.eq_ignore_ascii_case("host") {
            return Err(ConfigError::Validation(
                "The Host header is computed per request and cannot be overridden".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates that every part of a level is present
fn validate_level(what: &str, level: &Level) -> Result<(), ConfigError> {
    if level.tag.trim().is_empty()
        || level.attribute.trim().is_empty()
        || level.value.trim().is_empty()
    {
        return Err(ConfigError::Validation(format!(
            "{} {} needs a tag, an attribute and a value",
            what, level
        )));
    }
    Ok(())
}

/// Validates a domain, optionally carrying a port
fn validate_domain(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::Validation("domain cannot be empty".to_string()));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':')
    {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' has misplaced dots",
            domain
        )));
    }

    Ok(())
}
