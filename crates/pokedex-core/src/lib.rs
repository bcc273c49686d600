//! # Pokedex Core
//!
//! Core types, strategy traits and the access service for the Pokedex backend.
//!
//! The crate defines the fundamental abstractions using the Strategy pattern,
//! enabling pluggable implementations for:
//! - Document storage (MongoDB, in-memory)
//! - Catalogue listing (PokeAPI over HTTP)
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐     ┌──────────────┐
//! │ PokemonService │────►│ PokemonStore │◄────┐
//! └────────────────┘     └──────────────┘     │
//!                                      ┌──────┴──────┐     ┌────────────────┐
//!                                      │ SeedService │────►│ PokemonListing │
//!                                      └─────────────┘     └────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod model;
pub mod service;
pub mod strategy;

pub use config::*;
pub use error::*;
pub use memory::*;
pub use metrics::*;
pub use model::*;
pub use service::*;
pub use strategy::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::PokedexConfig;
    pub use crate::error::{ErrorKind, PokedexError, Result};
    pub use crate::model::{
        ListingEntry, NewPokemon, Page, Pagination, PokeListing, Pokemon, PokemonId, PokemonPatch,
    };
    pub use crate::service::PokemonService;
    pub use crate::strategy::{HealthCheck, PokemonListing, PokemonStore};
}
