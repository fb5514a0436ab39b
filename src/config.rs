//! Configuration management using Figment
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. `shelfcrate.toml` in the working directory (optional)
//! 3. `SHELFCRATE_`-prefixed environment variables, with `__` separating
//!    nested keys (`SHELFCRATE_QUERY__MAX_PAGE_SIZE=50`)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use sea_orm::DatabaseBackend;
use serde::{Deserialize, Serialize};

use crate::specification::{BuildOptions, StringMatching};

pub const CONFIG_FILE: &str = "shelfcrate.toml";
pub const ENV_PREFIX: &str = "SHELFCRATE_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    /// Default `tracing` filter; `RUST_LOG` takes precedence when set.
    pub log_level: String,
    pub query: QueryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://shelfcrate.db?mode=rwc".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            query: QueryConfig::default(),
        }
    }
}

/// Settings for criteria queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub string_matching: StringMatching,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            string_matching: StringMatching::CaseInsensitive,
        }
    }
}

impl QueryConfig {
    #[must_use]
    pub fn build_options(&self, backend: DatabaseBackend) -> BuildOptions {
        BuildOptions {
            string_matching: self.string_matching,
            backend,
        }
    }
}

impl AppConfig {
    /// Load from defaults, [`CONFIG_FILE`] and the environment.
    ///
    /// # Errors
    ///
    /// Returns the figment error when a source cannot be parsed or the result
    /// fails validation.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(CONFIG_FILE)
    }

    /// Same as [`AppConfig::load`] with an explicit TOML path.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::load`].
    pub fn load_from(path: &str) -> Result<Self, Box<figment::Error>> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<(), Box<figment::Error>> {
        if self.database_url.is_empty() {
            return Err(Box::new(figment::Error::from(
                "database_url cannot be empty".to_string(),
            )));
        }

        if self.query.default_page_size == 0 {
            return Err(Box::new(figment::Error::from(
                "query.default_page_size must be greater than 0".to_string(),
            )));
        }

        if self.query.max_page_size < self.query.default_page_size {
            return Err(Box::new(figment::Error::from(format!(
                "query.max_page_size ({}) must be at least query.default_page_size ({})",
                self.query.max_page_size, self.query.default_page_size
            ))));
        }

        Ok(())
    }
}
