//! Strategy traits for Pokedex
//!
//! The services never talk to MongoDB or to the remote catalogue directly.
//! They go through the two seams defined here, which lets the binary plug in
//! the real clients while tests use in-memory doubles.
//!
//! ```text
//! PokemonService ──► PokemonStore ◄── SeedService ──► PokemonListing
//!                      │                                   │
//!                 MongoStore, MemoryStore          PokeApiClient, ...
//! ```

use crate::error::Result;
use crate::model::{NewPokemon, Page, PokeListing, Pokemon, PokemonId, PokemonPatch};
use async_trait::async_trait;

/// Health check capability
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Perform health check
    ///
    /// Returns Ok(()) if healthy, Err with details if not.
    async fn health_check(&self) -> Result<()>;

    /// Get component name for health reporting
    fn component_name(&self) -> &'static str;
}

/// Document store strategy for the Pokemon collection
///
/// Implementations must enforce uniqueness of `no` and `name` and report a
/// violation as `PokedexError::DuplicateKey`.
///
/// Implementations:
/// - `MongoStore`: MongoDB collection with unique indexes
/// - `MemoryStore`: in-process map (for testing)
#[async_trait]
pub trait PokemonStore: HealthCheck {
    /// Insert one record and return it with its assigned id
    async fn insert(&self, pokemon: NewPokemon) -> Result<Pokemon>;

    /// Records ordered by ascending `no` within the page window
    async fn list(&self, page: Page) -> Result<Vec<Pokemon>>;

    async fn find_by_no(&self, no: i32) -> Result<Option<Pokemon>>;

    async fn find_by_id(&self, id: &PokemonId) -> Result<Option<Pokemon>>;

    /// Lookup by already-normalized name
    async fn find_by_name(&self, name: &str) -> Result<Option<Pokemon>>;

    /// Apply a partial update and return the persisted post-update record
    ///
    /// Returns `None` when no record has this id.
    async fn update(&self, id: &PokemonId, patch: &PokemonPatch) -> Result<Option<Pokemon>>;

    /// Delete by id, returning the number of removed records
    async fn delete(&self, id: &PokemonId) -> Result<u64>;

    /// Replace the whole collection with `batch`
    ///
    /// The previous contents must survive if the batch cannot be written.
    async fn replace_all(&self, batch: Vec<NewPokemon>) -> Result<usize>;

    async fn count(&self) -> Result<u64>;
}

/// Remote catalogue listing strategy
///
/// Implementations:
/// - `PokeApiClient`: HTTP GET against the public PokeAPI
#[async_trait]
pub trait PokemonListing: Send + Sync {
    /// Fetch one page of at most `limit` entries
    async fn fetch_listing(&self, limit: u32) -> Result<PokeListing>;
}
