//! # Pokedex Seed
//!
//! Imports the public catalogue into the Pokemon collection.
//!
//! ## Strategies
//!
//! - `PokeApiClient`: `PokemonListing` over the PokeAPI `/pokemon` endpoint
//!
//! ## Usage
//!
//! ```rust,ignore
//! let listing = PokeApiClient::new(PokeApiConfig::from(&config.seed))?;
//! let seed = SeedService::new(store, Arc::new(listing));
//! let report = seed.execute_seed().await?;
//! ```

pub mod poke_api;
pub mod seed;

pub use poke_api::*;
pub use seed::*;
