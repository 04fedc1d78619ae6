//! Korzina: a catalog product harvester
//!
//! This crate implements a bounded-concurrency crawler that discovers product
//! detail pages from a paginated e-commerce food catalog, extracts structured
//! product records through ordered per-field strategy chains, and filters them
//! through a category classifier.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Korzina operations
#[derive(Debug, Error)]
pub enum KorzinaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Extraction task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid detail-URL pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Korzina operations
pub type Result<T> = std::result::Result<T, KorzinaError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_pipeline, FetchClient, PipelineReport};
pub use extract::{Product, RawProduct};
pub use output::RunStats;
