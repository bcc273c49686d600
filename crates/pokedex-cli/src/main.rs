//! Pokedex CLI
//!
//! Runs one access-service operation, the seed job, or the admin API.

use clap::{Parser, Subcommand};
use pokedex_cli::{init_tracing, run_admin_server, AdminState};
use pokedex_core::prelude::*;
use pokedex_seed::{PokeApiClient, PokeApiConfig, SeedService};
use pokedex_store::{MongoStore, MongoStoreConfig};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Pokemon collection backend with a PokeAPI seed job")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "POKEDEX_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (overrides observability.log_level)
    #[arg(long, env = "LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the admin API (health, readiness, stats) on PORT
    Serve,

    /// Replace the collection with the PokeAPI listing
    Seed,

    /// Create a record
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        no: i32,
    },

    /// List records ordered by number
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Find a record by number, id or name
    Find { term: String },

    /// Update the record matching TERM
    Update {
        term: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        no: Option<i32>,
    },

    /// Remove a record by id
    Remove { id: String },
}

#[derive(Serialize)]
struct Removed<'a> {
    removed: &'a str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = PokedexConfig::load(args.config.as_deref())?;
    init_tracing(&config.observability, args.log_level.as_deref());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = ?args.command,
        "Starting pokedex"
    );

    let store_config = MongoStoreConfig::with_uri(config.mongodb_uri()?);
    let store = Arc::new(MongoStore::connect(store_config).await?);

    if let Err(e) = run(args.command, &config, store).await {
        error!(error = %e, kind = %e.kind(), "Command failed");
        return Err(e.into());
    }
    Ok(())
}

async fn run(command: Command, config: &PokedexConfig, store: Arc<MongoStore>) -> Result<()> {
    let service = PokemonService::new(store.clone()).with_default_limit(config.default_limit);

    match command {
        Command::Serve => {
            let listen = format!("0.0.0.0:{}", config.port);
            run_admin_server(listen, AdminState { store }).await?;
        }
        Command::Seed => {
            let listing = PokeApiClient::new(PokeApiConfig::from(&config.seed))?;
            let seed = SeedService::new(store, Arc::new(listing))
                .with_listing_limit(config.seed.listing_limit);
            print_json(&seed.execute_seed().await?)?;
        }
        Command::Create { name, no } => {
            print_json(&service.create(NewPokemon::new(name, no)).await?)?;
        }
        Command::List { limit, offset } => {
            print_json(&service.list(Pagination::new(limit, offset)).await?)?;
        }
        Command::Find { term } => {
            print_json(&service.find_one(&term).await?)?;
        }
        Command::Update { term, name, no } => {
            let patch = PokemonPatch { name, no };
            print_json(&service.update(&term, patch).await?)?;
        }
        Command::Remove { id } => {
            service.remove(&id).await?;
            print_json(&Removed { removed: &id })?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
