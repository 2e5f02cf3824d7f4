//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Fallback threshold must be at least 1")]
    InvalidFallbackThreshold,

    #[error("top_k must be at least 1")]
    InvalidTopK,

    #[error("Rerank blend must be within [0, 1]")]
    InvalidRerankBlend,

    #[error("Alpha presets must be within [0, 1]")]
    InvalidAlphaPreset,

    #[error("Enrichment timeout must be between 100ms and 30s")]
    InvalidEnrichmentTimeout,

    #[error("Invalid provider base URL: {0}")]
    InvalidProviderUrl(&'static str),
}
