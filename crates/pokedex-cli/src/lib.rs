//! # Pokedex CLI
//!
//! Command line front end for the Pokedex backend: CRUD over the Pokemon
//! collection, the catalogue seed job and a small admin API.
//!
//! ```bash
//! MONGODB=mongodb://localhost:27017 pokedex seed
//! MONGODB=mongodb://localhost:27017 pokedex find pikachu
//! MONGODB=mongodb://localhost:27017 pokedex serve
//! ```

pub mod admin_api;

pub use admin_api::*;

use pokedex_core::ObservabilityConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `level`; `observability.log_format` picks JSON or
/// human-readable output. Logs go to stderr so stdout stays parseable.
pub fn init_tracing(observability: &ObservabilityConfig, level: Option<&str>) {
    let level = level.unwrap_or(&observability.log_level).to_string();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let registry = tracing_subscriber::registry().with(filter);
    if observability.log_format == "pretty" {
        registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    }
}
