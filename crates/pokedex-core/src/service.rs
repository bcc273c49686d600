//! Pokemon access service
//!
//! Create, list, resolve, update and remove records through a [`PokemonStore`].
//! All failures leave this service as one of the client-facing categories:
//! `NotFound`, `DuplicateKey`/`BadRequest`, or a generic `Internal` error whose
//! details only go to the log.

use crate::error::{PokedexError, Result};
use crate::metrics::AccessMetrics;
use crate::model::{
    normalize_name, parse_ordinal, NewPokemon, Pagination, Pokemon, PokemonId, PokemonPatch,
    DEFAULT_PAGE_LIMIT,
};
use crate::strategy::PokemonStore;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Access service over a store implementation
pub struct PokemonService<S: PokemonStore> {
    store: Arc<S>,
    default_limit: u32,
    metrics: AccessMetrics,
}

impl<S: PokemonStore> PokemonService<S> {
    /// Create a service with the built-in page size of 10
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            default_limit: DEFAULT_PAGE_LIMIT,
            metrics: AccessMetrics::new("pokemon_service"),
        }
    }

    /// Builder: page size used when a listing gives no limit
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Insert a new record with a normalized name
    pub async fn create(&self, pokemon: NewPokemon) -> Result<Pokemon> {
        let pokemon = pokemon.normalized()?;

        let created = self
            .store
            .insert(pokemon)
            .await
            .map_err(|e| self.handle_error("create", e))?;

        self.metrics.record_created();
        info!(id = %created.id, no = created.no, name = %created.name, "Pokemon created");
        Ok(created)
    }

    /// Records sorted by ascending `no`
    pub async fn list(&self, pagination: Pagination) -> Result<Vec<Pokemon>> {
        let page = pagination.resolve(self.default_limit)?;
        let records = self
            .store
            .list(page)
            .await
            .map_err(|e| self.handle_error("list", e))?;

        debug!(limit = page.limit, offset = page.offset, count = records.len(), "Listed pokemon");
        Ok(records)
    }

    /// Resolve a record by ordinal number, document id or name, in that order
    ///
    /// The first branch that yields a record wins. A numeric term that matches
    /// no ordinal still falls through to the id and name lookups.
    pub async fn find_one(&self, term: &str) -> Result<Pokemon> {
        let term = term.trim();

        if let Some(no) = parse_ordinal(term) {
            if let Some(found) = self.lookup("find_by_no", self.store.find_by_no(no)).await? {
                self.metrics.record_lookup("no");
                return Ok(found);
            }
        }

        if let Some(id) = PokemonId::parse(term) {
            if let Some(found) = self.lookup("find_by_id", self.store.find_by_id(&id)).await? {
                self.metrics.record_lookup("id");
                return Ok(found);
            }
        }

        if let Ok(name) = normalize_name(term) {
            if let Some(found) = self.lookup("find_by_name", self.store.find_by_name(&name)).await? {
                self.metrics.record_lookup("name");
                return Ok(found);
            }
        }

        self.metrics.record_lookup("miss");
        debug!(term, "Pokemon not found");
        Err(PokedexError::not_found(term))
    }

    /// Apply a partial update to the record `term` resolves to
    ///
    /// Returns the persisted state after the update.
    pub async fn update(&self, term: &str, patch: PokemonPatch) -> Result<Pokemon> {
        let current = self.find_one(term).await?;
        let patch = patch.normalized()?;

        if patch.is_empty() {
            return Ok(current);
        }

        let updated = self
            .store
            .update(&current.id, &patch)
            .await
            .map_err(|e| self.handle_error("update", e))?
            // Deleted between lookup and write
            .ok_or_else(|| PokedexError::not_found(term.trim()))?;

        self.metrics.record_updated();
        info!(id = %updated.id, no = updated.no, name = %updated.name, "Pokemon updated");
        Ok(updated)
    }

    /// Delete by document id
    pub async fn remove(&self, id: &str) -> Result<()> {
        let parsed = PokemonId::parse(id.trim())
            .ok_or_else(|| PokedexError::bad_request(format!("{} is not a valid id", id)))?;

        let deleted = self
            .store
            .delete(&parsed)
            .await
            .map_err(|e| self.handle_error("remove", e))?;

        if deleted == 0 {
            return Err(PokedexError::bad_request(format!(
                "Pokemon with id \"{}\" not found",
                parsed
            )));
        }

        self.metrics.record_removed();
        info!(id = %parsed, "Pokemon removed");
        Ok(())
    }

    async fn lookup(
        &self,
        operation: &'static str,
        query: impl std::future::Future<Output = Result<Option<Pokemon>>>,
    ) -> Result<Option<Pokemon>> {
        query.await.map_err(|e| self.handle_error(operation, e))
    }

    /// Translate store failures into client-facing errors
    fn handle_error(&self, operation: &'static str, err: PokedexError) -> PokedexError {
        if err.is_client_error() {
            return err;
        }

        self.metrics.record_store_error(operation);
        error!(error = %err, operation, "Store operation failed");
        PokedexError::Internal("can't complete the operation, check server logs".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::memory::MemoryStore;
    use crate::model::Page;
    use crate::strategy::HealthCheck;
    use async_trait::async_trait;

    fn service() -> PokemonService<MemoryStore> {
        PokemonService::new(Arc::new(MemoryStore::new()))
    }

    async fn seeded(names: &[(&str, i32)]) -> PokemonService<MemoryStore> {
        let service = service();
        for (name, no) in names {
            service.create(NewPokemon::new(*name, *no)).await.unwrap();
        }
        service
    }

    #[tokio::test]
    async fn test_create_lowercases_name() {
        let service = service();
        let created = service.create(NewPokemon::new("Pikachu", 25)).await.unwrap();
        assert_eq!(created.name, "pikachu");

        let stored = service.store().find_by_name("pikachu").await.unwrap();
        assert_eq!(stored, Some(created));
    }

    #[tokio::test]
    async fn test_create_duplicate_no() {
        let service = seeded(&[("pikachu", 25)]).await;
        let err = service.create(NewPokemon::new("raichu", 25)).await.unwrap_err();

        assert!(matches!(err, PokedexError::DuplicateKey { .. }));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let service = seeded(&[("squirtle", 7), ("bulbasaur", 1), ("charmander", 4)]).await;

        let page = service.list(Pagination::new(Some(2), Some(0))).await.unwrap();
        let nos: Vec<i32> = page.iter().map(|p| p.no).collect();
        assert_eq!(nos, vec![1, 4]);

        let rest = service.list(Pagination::new(Some(2), Some(2))).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "squirtle");
    }

    #[tokio::test]
    async fn test_list_uses_default_limit() {
        let service = service().with_default_limit(2);
        for no in 1..=5 {
            service
                .create(NewPokemon::new(format!("mon{}", no), no))
                .await
                .unwrap();
        }
        assert_eq!(service.list(Pagination::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_one_by_no_id_and_name() {
        let service = seeded(&[("pikachu", 25), ("mew", 151)]).await;
        let mew = service.find_one("151").await.unwrap();

        assert_eq!(service.find_one("25").await.unwrap().name, "pikachu");
        assert_eq!(service.find_one(mew.id.as_str()).await.unwrap(), mew);
        assert_eq!(service.find_one("  PIKACHU ").await.unwrap().no, 25);
    }

    #[tokio::test]
    async fn test_find_one_accepts_integral_number_forms() {
        let service = seeded(&[("pikachu", 25), ("porygon", 137)]).await;

        assert_eq!(service.find_one("25.0").await.unwrap().name, "pikachu");
        assert_eq!(service.find_one("1.37e2").await.unwrap().name, "porygon");

        let err = service.find_one("25.5").await.unwrap_err();
        assert!(matches!(err, PokedexError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_one_numeric_falls_back_to_name() {
        let service = seeded(&[("404", 1)]).await;
        assert_eq!(service.find_one("404").await.unwrap().no, 1);
    }

    #[tokio::test]
    async fn test_find_one_not_found() {
        let service = seeded(&[("pikachu", 25)]).await;

        let err = service.find_one("nonexistent-name").await.unwrap_err();
        assert!(matches!(err, PokedexError::NotFound { .. }));

        let err = service.find_one("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_returns_persisted_state() {
        let service = seeded(&[("pikachu", 25)]).await;

        let updated = service
            .update("pikachu", PokemonPatch::default().with_name(" Raichu "))
            .await
            .unwrap();
        assert_eq!(updated.name, "raichu");
        assert_eq!(updated.no, 25);

        assert_eq!(service.find_one("25").await.unwrap(), updated);
        assert!(service.find_one("pikachu").await.is_err());
    }

    #[tokio::test]
    async fn test_update_errors() {
        let service = seeded(&[("pikachu", 25), ("raichu", 26)]).await;

        let err = service
            .update("missingno", PokemonPatch::default().with_no(0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = service
            .update("raichu", PokemonPatch::default().with_no(25))
            .await
            .unwrap_err();
        assert!(matches!(err, PokedexError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_remove() {
        let service = seeded(&[("pikachu", 25)]).await;
        let pikachu = service.find_one("25").await.unwrap();

        let err = service.remove("000000000000000000000000").await.unwrap_err();
        assert!(matches!(err, PokedexError::BadRequest { .. }));

        let err = service.remove("pikachu").await.unwrap_err();
        assert!(matches!(err, PokedexError::BadRequest { .. }));

        service.remove(pikachu.id.as_str()).await.unwrap();
        let err = service.find_one(pikachu.id.as_str()).await.unwrap_err();
        assert!(matches!(err, PokedexError::NotFound { .. }));
    }

    /// Store whose every call fails with a connection error
    struct BrokenStore;

    #[async_trait]
    impl HealthCheck for BrokenStore {
        async fn health_check(&self) -> Result<()> {
            Err(PokedexError::store("connection refused"))
        }

        fn component_name(&self) -> &'static str {
            "broken_store"
        }
    }

    #[async_trait]
    impl PokemonStore for BrokenStore {
        async fn insert(&self, _: NewPokemon) -> Result<Pokemon> {
            Err(PokedexError::store("connection refused"))
        }
        async fn list(&self, _: Page) -> Result<Vec<Pokemon>> {
            Err(PokedexError::store("connection refused"))
        }
        async fn find_by_no(&self, _: i32) -> Result<Option<Pokemon>> {
            Err(PokedexError::store("connection refused"))
        }
        async fn find_by_id(&self, _: &PokemonId) -> Result<Option<Pokemon>> {
            Err(PokedexError::store("connection refused"))
        }
        async fn find_by_name(&self, _: &str) -> Result<Option<Pokemon>> {
            Err(PokedexError::store("connection refused"))
        }
        async fn update(&self, _: &PokemonId, _: &PokemonPatch) -> Result<Option<Pokemon>> {
            Err(PokedexError::store("connection refused"))
        }
        async fn delete(&self, _: &PokemonId) -> Result<u64> {
            Err(PokedexError::store("connection refused"))
        }
        async fn replace_all(&self, _: Vec<NewPokemon>) -> Result<usize> {
            Err(PokedexError::store("connection refused"))
        }
        async fn count(&self) -> Result<u64> {
            Err(PokedexError::store("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_store_failures_become_internal() {
        let service = PokemonService::new(Arc::new(BrokenStore));

        let err = service.create(NewPokemon::new("mew", 151)).await.unwrap_err();
        assert!(matches!(err, PokedexError::Internal(_)));
        assert!(!err.to_string().contains("connection refused"));

        let err = service.find_one("mew").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
