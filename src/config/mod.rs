//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `WAYFARER_` prefix and nested values use `__` as separator, e.g.
//! `WAYFARER_SEARCH__TOP_K=5`.

mod error;
mod providers;
mod search;
mod server;

pub use error::{ConfigError, ValidationError};
pub use providers::ProvidersConfig;
pub use search::SearchConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Hybrid search tuning (top_k, fallback threshold, re-rank blend)
    #[serde(default)]
    pub search: SearchConfig,

    /// Enrichment collaborator endpoints and deadlines
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file if present, then environment variables with the
    /// `WAYFARER` prefix. All sections have working defaults, so an empty
    /// environment yields a runnable development configuration.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("WAYFARER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.search.validate()?;
        self.providers.validate()?;
        Ok(())
    }
}
