//! Configuration types for Pokedex
//!
//! Uses the `config` crate for layered configuration from defaults, an
//! optional file and the process environment.

use crate::error::{PokedexError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Database name holding the Pokemon collection
pub const DATABASE_NAME: &str = "db_pokemon";

/// Prefix for nested settings taken from the environment
const ENV_PREFIX: &str = "POKEDEX";

/// Top-level keys read from bare environment variables
const UNPREFIXED_VARS: [(&str, &str); 3] = [
    ("mongodb", "MONGODB"),
    ("port", "PORT"),
    ("default_limit", "DEFAULT_LIMIT"),
];

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokedexConfig {
    /// MongoDB connection string (env `MONGODB`, required)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongodb: Option<String>,

    /// Listening port for the admin API (env `PORT`)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Page size used when a listing gives no limit (env `DEFAULT_LIMIT`)
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Seed job configuration
    #[serde(default)]
    pub seed: SeedConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_port() -> u16 {
    3005
}

fn default_limit() -> u32 {
    6
}

impl Default for PokedexConfig {
    fn default() -> Self {
        Self {
            mongodb: None,
            port: default_port(),
            default_limit: default_limit(),
            seed: SeedConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Seed job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Base url of the catalogue API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Number of entries requested from the listing endpoint
    #[serde(default = "default_listing_limit")]
    pub listing_limit: u32,

    /// Connection timeout
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Request timeout
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

fn default_api_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_listing_limit() -> u32 {
    650
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            listing_limit: default_listing_limit(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

impl PokedexConfig {
    /// Load configuration from defaults, an optional file and the environment
    ///
    /// `MONGODB`, `PORT` and `DEFAULT_LIMIT` are read as-is. Every other key
    /// comes from `POKEDEX_`-prefixed variables, with `__` between nested
    /// keys, e.g. `POKEDEX_SEED__LISTING_LIMIT`. The result is validated
    /// before it is returned.
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_from(path, std::env::vars().collect())
    }

    fn load_from(path: Option<&str>, env: config::Map<String, String>) -> Result<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone())),
        );

        for (key, var) in UNPREFIXED_VARS {
            builder = builder.set_override_option(key, env.get(var).cloned())?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on unusable settings
    pub fn validate(&self) -> Result<()> {
        match self.mongodb.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(PokedexError::config(
                    "MONGODB connection string is required",
                ))
            }
            Some(_) => {}
        }
        if self.port == 0 {
            return Err(PokedexError::config("PORT must be greater than 0"));
        }
        if self.default_limit == 0 {
            return Err(PokedexError::config("DEFAULT_LIMIT must be at least 1"));
        }
        if self.seed.listing_limit == 0 {
            return Err(PokedexError::config("seed.listing_limit must be at least 1"));
        }
        Url::parse(&self.seed.api_url).map_err(|e| {
            PokedexError::config(format!("seed.api_url is not a valid url: {}", e))
        })?;
        Ok(())
    }

    /// Connection string; only valid after `validate`
    pub fn mongodb_uri(&self) -> Result<&str> {
        self.mongodb
            .as_deref()
            .ok_or_else(|| PokedexError::config("MONGODB connection string is required"))
    }
}
