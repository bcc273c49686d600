//! Collection seed job
//!
//! Repopulates the Pokemon collection from the catalogue listing. The listing
//! is fetched and fully converted before the store is touched, and the store
//! swaps the new contents in with `replace_all`, so a failed run leaves the
//! previous collection in place.

use pokedex_core::prelude::*;
use pokedex_core::{LatencyTimer, SeedMetrics};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Confirmation returned by every successful run
pub const SEED_CONFIRMATION: &str = "Seed executed";

/// Default number of listing entries requested
pub const DEFAULT_LISTING_LIMIT: u32 = 650;

/// Outcome of a seed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub message: &'static str,
    pub inserted: usize,
}

/// Seed job over a store and a listing source
pub struct SeedService<S, L>
where
    S: PokemonStore,
    L: PokemonListing,
{
    store: Arc<S>,
    listing: Arc<L>,
    listing_limit: u32,
    metrics: SeedMetrics,
}

impl<S, L> SeedService<S, L>
where
    S: PokemonStore,
    L: PokemonListing,
{
    pub fn new(store: Arc<S>, listing: Arc<L>) -> Self {
        Self {
            store,
            listing,
            listing_limit: DEFAULT_LISTING_LIMIT,
            metrics: SeedMetrics::new("seed_service"),
        }
    }

    /// Builder: number of entries requested from the listing
    pub fn with_listing_limit(mut self, limit: u32) -> Self {
        self.listing_limit = limit.max(1);
        self
    }

    /// Replace the collection with the current catalogue listing
    pub async fn execute_seed(&self) -> Result<SeedReport> {
        let metrics = self.metrics.clone();
        let _timer = LatencyTimer::start(move |d| metrics.record_duration(d));

        match self.run().await {
            Ok(report) => {
                self.metrics.record_run("ok");
                self.metrics.record_inserted(report.inserted as u64);
                info!(inserted = report.inserted, "Seed completed");
                Ok(report)
            }
            Err(e) => {
                self.metrics.record_run("failed");
                error!(error = %e, "Seed failed, collection left unchanged");
                Err(e)
            }
        }
    }

    async fn run(&self) -> Result<SeedReport> {
        info!(limit = self.listing_limit, "Fetching catalogue listing");
        let listing = self.listing.fetch_listing(self.listing_limit).await?;

        let batch = listing
            .results
            .iter()
            .map(ListingEntry::to_new_pokemon)
            .collect::<Result<Vec<_>>>()?;

        let inserted = self.store.replace_all(batch).await?;

        Ok(SeedReport {
            message: SEED_CONFIRMATION,
            inserted,
        })
    }
}
