//! # Pokedex Store
//!
//! MongoDB implementation of the `PokemonStore` strategy.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let store = MongoStore::connect(MongoStoreConfig::with_uri(uri)).await?;
//! let service = PokemonService::new(Arc::new(store));
//! ```

pub mod mongo_store;

pub use mongo_store::*;
