use crate::config::types::{
    CategoryEntry, ClassifierConfig, Config, CrawlConfig, ExtractConfig, FetchConfig,
    OutputConfig,
};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_crawl_config(&config.crawl)?;
    validate_extract_config(&config.extract)?;
    validate_output_config(&config.output)?;
    validate_classifier_config(&config.classifier)?;
    validate_categories(&config.categories)?;
    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must be http(s), got '{}'",
            config.base_url
        )));
    }

    Regex::new(&config.detail_url_pattern).map_err(|e| {
        ConfigError::InvalidPattern(format!(
            "detail_url_pattern '{}' does not compile: {}",
            config.detail_url_pattern, e
        ))
    })?;

    if config.page_ceiling < 1 {
        return Err(ConfigError::Validation(
            "page_ceiling must be >= 1".to_string(),
        ));
    }

    if config.target_count == 0 {
        return Err(ConfigError::Validation(
            "target_count must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    if config.batch_size == 0 {
        return Err(ConfigError::Validation(
            "batch_size must be >= 1".to_string(),
        ));
    }

    if config.max_concurrent_extractions < 1 {
        return Err(ConfigError::Validation(
            "max_concurrent_extractions must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if config.jsonl_path.is_empty() {
        return Err(ConfigError::Validation(
            "jsonl_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    if config.allow_keywords.is_empty() {
        return Err(ConfigError::Validation(
            "classifier allow_keywords cannot be empty".to_string(),
        ));
    }

    for kw in config
        .allow_keywords
        .iter()
        .chain(config.deny_keywords.iter())
    {
        if kw.trim().is_empty() {
            return Err(ConfigError::Validation(
                "classifier keywords cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[categories]] entry is required".to_string(),
        ));
    }

    for entry in categories {
        if !entry.path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "category path '{}' must start with '/'",
                entry.path
            )));
        }

        if entry.label.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' must have a non-empty label",
                entry.path
            )));
        }

        if entry.max_products == 0 {
            return Err(ConfigError::Validation(format!(
                "category '{}' max_products must be >= 1",
                entry.path
            )));
        }
    }

    Ok(())
}
