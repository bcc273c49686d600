//! In-memory Pokemon store (for testing)
//!
//! Mirrors the behaviour of the MongoDB store: unique `no` and `name`,
//! ascending `no` ordering and store-assigned 24-hex ids.

use crate::error::{PokedexError, Result};
use crate::model::{NewPokemon, Page, Pokemon, PokemonId, PokemonPatch};
use crate::strategy::{HealthCheck, PokemonStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

/// In-memory store keyed by id
pub struct MemoryStore {
    records: RwLock<BTreeMap<PokemonId, Pokemon>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn generate_id(&self) -> PokemonId {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let counter = self.next_id.fetch_add(1, Ordering::Relaxed);
        PokemonId::from_parts(secs as u32, counter)
    }

    /// Check a candidate against every record except `skip`
    fn check_unique(
        records: &BTreeMap<PokemonId, Pokemon>,
        name: &str,
        no: i32,
        skip: Option<&PokemonId>,
    ) -> Result<()> {
        for existing in records.values() {
            if Some(&existing.id) == skip {
                continue;
            }
            if existing.no == no {
                return Err(PokedexError::duplicate(format!("{{ no: {} }}", no)));
            }
            if existing.name == name {
                return Err(PokedexError::duplicate(format!("{{ name: \"{}\" }}", name)));
            }
        }
        Ok(())
    }

    fn build_batch(&self, batch: Vec<NewPokemon>) -> Result<BTreeMap<PokemonId, Pokemon>> {
        let mut staged = BTreeMap::new();
        for new in batch {
            Self::check_unique(&staged, &new.name, new.no, None)?;
            let pokemon = Pokemon {
                id: self.generate_id(),
                no: new.no,
                name: new.name,
            };
            staged.insert(pokemon.id.clone(), pokemon);
        }
        Ok(staged)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn component_name(&self) -> &'static str {
        "memory_store"
    }
}

#[async_trait]
impl PokemonStore for MemoryStore {
    async fn insert(&self, pokemon: NewPokemon) -> Result<Pokemon> {
        let mut records = self.records.write().await;
        Self::check_unique(&records, &pokemon.name, pokemon.no, None)?;

        let pokemon = Pokemon {
            id: self.generate_id(),
            no: pokemon.no,
            name: pokemon.name,
        };
        records.insert(pokemon.id.clone(), pokemon.clone());
        Ok(pokemon)
    }

    async fn list(&self, page: Page) -> Result<Vec<Pokemon>> {
        let records = self.records.read().await;
        let mut all: Vec<Pokemon> = records.values().cloned().collect();
        all.sort_by_key(|p| p.no);
        Ok(all
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn find_by_no(&self, no: i32) -> Result<Option<Pokemon>> {
        let records = self.records.read().await;
        Ok(records.values().find(|p| p.no == no).cloned())
    }

    async fn find_by_id(&self, id: &PokemonId) -> Result<Option<Pokemon>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Pokemon>> {
        let records = self.records.read().await;
        Ok(records.values().find(|p| p.name == name).cloned())
    }

    async fn update(&self, id: &PokemonId, patch: &PokemonPatch) -> Result<Option<Pokemon>> {
        let mut records = self.records.write().await;
        let Some(current) = records.get(id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        patch.apply_to(&mut updated);
        Self::check_unique(&records, &updated.name, updated.no, Some(id))?;

        records.insert(id.clone(), updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: &PokemonId) -> Result<u64> {
        Ok(self.records.write().await.remove(id).map_or(0, |_| 1))
    }

    async fn replace_all(&self, batch: Vec<NewPokemon>) -> Result<usize> {
        let staged = self.build_batch(batch)?;
        let count = staged.len();
        *self.records.write().await = staged;
        Ok(count)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_valid_ids() {
        let store = MemoryStore::new();
        let a = store.insert(NewPokemon::new("bulbasaur", 1)).await.unwrap();
        let b = store.insert(NewPokemon::new("ivysaur", 2)).await.unwrap();

        assert_ne!(a.id, b.id);
        assert!(PokemonId::is_valid(a.id.as_str()));
        assert_eq!(store.find_by_id(&b.id).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = MemoryStore::new();
        store.insert(NewPokemon::new("pikachu", 25)).await.unwrap();

        let err = store.insert(NewPokemon::new("raichu", 25)).await.unwrap_err();
        assert!(matches!(err, PokedexError::DuplicateKey { .. }));

        let err = store.insert(NewPokemon::new("pikachu", 26)).await.unwrap_err();
        assert!(matches!(err, PokedexError::DuplicateKey { .. }));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_by_no() {
        let store = MemoryStore::new();
        store
            .replace_all(vec![
                NewPokemon::new("charmander", 4),
                NewPokemon::new("bulbasaur", 1),
                NewPokemon::new("squirtle", 7),
            ])
            .await
            .unwrap();

        let page = store.list(Page { limit: 2, offset: 1 }).await.unwrap();
        let nos: Vec<i32> = page.iter().map(|p| p.no).collect();
        assert_eq!(nos, vec![4, 7]);
    }

    #[tokio::test]
    async fn test_update_rejects_collision() {
        let store = MemoryStore::new();
        let mew = store.insert(NewPokemon::new("mew", 151)).await.unwrap();
        store.insert(NewPokemon::new("mewtwo", 150)).await.unwrap();

        let patch = PokemonPatch::default().with_no(150);
        let err = store.update(&mew.id, &patch).await.unwrap_err();
        assert!(matches!(err, PokedexError::DuplicateKey { .. }));

        // Updating a record to its own values is not a collision
        let patch = PokemonPatch::default().with_name("mew");
        assert!(store.update(&mew.id, &patch).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_replace_all_keeps_old_contents_on_duplicate() {
        let store = MemoryStore::new();
        store.insert(NewPokemon::new("ditto", 132)).await.unwrap();

        let err = store
            .replace_all(vec![NewPokemon::new("eevee", 133), NewPokemon::new("eevee", 134)])
            .await
            .unwrap_err();
        assert!(matches!(err, PokedexError::DuplicateKey { .. }));
        assert!(store.find_by_name("ditto").await.unwrap().is_some());

        let written = store
            .replace_all(vec![NewPokemon::new("eevee", 133)])
            .await
            .unwrap();
        assert_eq!(written, 1);
        assert!(store.find_by_name("ditto").await.unwrap().is_none());
    }
}
