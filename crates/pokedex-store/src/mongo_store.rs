//! MongoDB store
//!
//! Binds [`Pokemon`] records to documents of the `pokemons` collection and
//! maps driver errors onto `PokedexError`, turning E11000 into `DuplicateKey`.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, InsertManyError, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use pokedex_core::prelude::*;
use pokedex_core::DATABASE_NAME;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, trace};

/// Server error code for unique index violations
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB store configuration
#[derive(Debug, Clone)]
pub struct MongoStoreConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub app_name: String,
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
}

impl Default for MongoStoreConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: DATABASE_NAME.to_string(),
            collection: "pokemons".to_string(),
            app_name: "pokedex".to_string(),
            connect_timeout: Duration::from_secs(10),
            server_selection_timeout: Duration::from_secs(30),
        }
    }
}

impl MongoStoreConfig {
    /// Config for `uri` with default database and collection names
    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    fn staging_collection(&self) -> String {
        format!("{}_staging", self.collection)
    }
}

/// Persisted document shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub no: i32,
}

impl PokemonDocument {
    fn from_new(pokemon: NewPokemon) -> Self {
        Self {
            id: None,
            name: pokemon.name,
            no: pokemon.no,
        }
    }

    fn into_pokemon(self) -> Result<Pokemon> {
        let id = self
            .id
            .ok_or_else(|| PokedexError::store("document without _id"))?;
        Ok(Pokemon {
            id: to_pokemon_id(&id)?,
            no: self.no,
            name: self.name,
        })
    }
}

/// MongoDB-backed Pokemon store
pub struct MongoStore {
    client: Client,
    database: Database,
    collection: Collection<PokemonDocument>,
    config: MongoStoreConfig,
}

impl MongoStore {
    /// Connect, verify the deployment answers and ensure unique indexes
    pub async fn connect(config: MongoStoreConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| PokedexError::store_with_source("Invalid connection string", e))?;
        options.app_name = Some(config.app_name.clone());
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.server_selection_timeout);

        let client = Client::with_options(options)
            .map_err(|e| PokedexError::store_with_source("Failed to create client", e))?;
        let database = client.database(&config.database);
        let collection = database.collection::<PokemonDocument>(&config.collection);

        let store = Self {
            client,
            database,
            collection,
            config,
        };

        store.ping().await?;
        Self::ensure_indexes(&store.collection).await?;

        info!(
            database = %store.config.database,
            collection = %store.config.collection,
            "Connected to MongoDB"
        );
        Ok(store)
    }

    /// Ping the deployment
    pub async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| PokedexError::store_with_source("Ping failed", e))?;
        Ok(())
    }

    /// Unique ascending indexes on `no` and `name`
    async fn ensure_indexes(collection: &Collection<PokemonDocument>) -> Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "no": 1 })
                .options(unique())
                .build(),
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(unique())
                .build(),
        ];

        collection
            .create_indexes(indexes)
            .await
            .map_err(|e| PokedexError::store_with_source("Failed to create indexes", e))?;

        trace!(collection = %collection.name(), "Indexes ensured");
        Ok(())
    }

    async fn find_one_by(&self, filter: Document, operation: &str) -> Result<Option<Pokemon>> {
        self.collection
            .find_one(filter)
            .await
            .map_err(|e| store_error(operation, e))?
            .map(PokemonDocument::into_pokemon)
            .transpose()
    }
}

#[async_trait]
impl HealthCheck for MongoStore {
    async fn health_check(&self) -> Result<()> {
        self.ping().await
    }

    fn component_name(&self) -> &'static str {
        "mongo_store"
    }
}

#[async_trait]
impl PokemonStore for MongoStore {
    async fn insert(&self, pokemon: NewPokemon) -> Result<Pokemon> {
        let mut document = PokemonDocument::from_new(pokemon);
        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(|e| store_error("insert", e))?;

        document.id = result.inserted_id.as_object_id();
        document.into_pokemon()
    }

    async fn list(&self, page: Page) -> Result<Vec<Pokemon>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "no": 1 })
            .skip(u64::from(page.offset))
            .limit(i64::from(page.limit))
            .projection(doc! { "__v": 0 })
            .await
            .map_err(|e| store_error("list", e))?;

        let documents: Vec<PokemonDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| store_error("list", e))?;

        documents
            .into_iter()
            .map(PokemonDocument::into_pokemon)
            .collect()
    }

    async fn find_by_no(&self, no: i32) -> Result<Option<Pokemon>> {
        self.find_one_by(doc! { "no": no }, "find_by_no").await
    }

    async fn find_by_id(&self, id: &PokemonId) -> Result<Option<Pokemon>> {
        let oid = to_object_id(id)?;
        self.find_one_by(doc! { "_id": oid }, "find_by_id").await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Pokemon>> {
        self.find_one_by(doc! { "name": name }, "find_by_name").await
    }

    async fn update(&self, id: &PokemonId, patch: &PokemonPatch) -> Result<Option<Pokemon>> {
        let oid = to_object_id(id)?;
        let set = set_document(patch);
        if set.is_empty() {
            return self.find_by_id(id).await;
        }

        self.collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| store_error("update", e))?
            .map(PokemonDocument::into_pokemon)
            .transpose()
    }

    async fn delete(&self, id: &PokemonId) -> Result<u64> {
        let oid = to_object_id(id)?;
        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(|e| store_error("delete", e))?;
        Ok(result.deleted_count)
    }

    /// Write into a staging collection, then rename it over the live one
    async fn replace_all(&self, batch: Vec<NewPokemon>) -> Result<usize> {
        let staging_name = self.config.staging_collection();
        let staging = self.database.collection::<PokemonDocument>(&staging_name);

        staging
            .drop()
            .await
            .map_err(|e| store_error("drop_staging", e))?;
        Self::ensure_indexes(&staging).await?;

        let count = batch.len();
        if count > 0 {
            let documents: Vec<PokemonDocument> =
                batch.into_iter().map(PokemonDocument::from_new).collect();
            if let Err(e) = staging.insert_many(documents).await {
                // Best effort; the live collection is untouched either way
                let _ = staging.drop().await;
                return Err(store_error("insert_staging", e));
            }
        }

        self.client
            .database("admin")
            .run_command(doc! {
                "renameCollection": format!("{}.{}", self.config.database, staging_name),
                "to": format!("{}.{}", self.config.database, self.config.collection),
                "dropTarget": true,
            })
            .await
            .map_err(|e| store_error("swap_staging", e))?;

        info!(count, collection = %self.config.collection, "Collection replaced");
        Ok(count)
    }

    async fn count(&self) -> Result<u64> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| store_error("count", e))
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn to_object_id(id: &PokemonId) -> Result<ObjectId> {
    ObjectId::parse_str(id.as_str())
        .map_err(|e| PokedexError::bad_request(format!("{} is not a valid id: {}", id, e)))
}

fn to_pokemon_id(oid: &ObjectId) -> Result<PokemonId> {
    let hex = oid.to_hex();
    PokemonId::parse(&hex)
        .ok_or_else(|| PokedexError::store(format!("unexpected object id {}", hex)))
}

/// `$set` body for the fields present in `patch`
fn set_document(patch: &PokemonPatch) -> Document {
    let mut set = Document::new();
    if let Some(ref name) = patch.name {
        set.insert("name", name.clone());
    }
    if let Some(no) = patch.no {
        set.insert("no", no);
    }
    set
}

/// Map a driver error, recognizing unique index violations
fn store_error(operation: &str, err: mongodb::error::Error) -> PokedexError {
    if let Some(message) = duplicate_key_message(&err) {
        return PokedexError::duplicate(dup_key_from_message(&message));
    }
    PokedexError::store_with_source(format!("{} failed", operation), err)
}

fn duplicate_key_message(err: &mongodb::error::Error) -> Option<String> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE => {
            Some(e.message.clone())
        }
        ErrorKind::Command(e) if e.code == DUPLICATE_KEY_CODE => Some(e.message.clone()),
        ErrorKind::InsertMany(InsertManyError {
            write_errors: Some(errors),
            ..
        }) => errors
            .iter()
            .find(|e| e.code == DUPLICATE_KEY_CODE)
            .map(|e| e.message.clone()),
        _ => None,
    }
}

/// Extract the `{ field: value }` part of an E11000 message
fn dup_key_from_message(message: &str) -> String {
    match message.split_once("dup key: ") {
        Some((_, rest)) => match rest.find('}') {
            Some(end) => rest[..=end].to_string(),
            None => rest.to_string(),
        },
        None => message.to_string(),
    }
}
