//! Metrics for Pokedex
//!
//! Provides Prometheus-compatible metrics for observability.

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Metric names as constants for consistency
pub mod names {
    // Access service metrics
    pub const POKEMON_CREATED_TOTAL: &str = "pokedex_pokemon_created_total";
    pub const POKEMON_UPDATED_TOTAL: &str = "pokedex_pokemon_updated_total";
    pub const POKEMON_REMOVED_TOTAL: &str = "pokedex_pokemon_removed_total";
    pub const POKEMON_LOOKUPS_TOTAL: &str = "pokedex_pokemon_lookups_total";
    pub const STORE_ERRORS_TOTAL: &str = "pokedex_store_errors_total";

    // Seed metrics
    pub const SEED_RUNS_TOTAL: &str = "pokedex_seed_runs_total";
    pub const SEED_DOCS_INSERTED: &str = "pokedex_seed_docs_inserted_total";
    pub const SEED_DURATION: &str = "pokedex_seed_duration_seconds";
}

/// Labels for metrics
pub mod labels {
    pub const COMPONENT: &str = "component";
    pub const OPERATION: &str = "operation";
    pub const RESOLVED_BY: &str = "resolved_by";
    pub const STATUS: &str = "status";
}

/// Access service metrics
#[derive(Clone)]
pub struct AccessMetrics {
    component: String,
}

impl AccessMetrics {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn record_created(&self) {
        counter!(
            names::POKEMON_CREATED_TOTAL,
            labels::COMPONENT => self.component.clone(),
        )
        .increment(1);
    }

    pub fn record_updated(&self) {
        counter!(
            names::POKEMON_UPDATED_TOTAL,
            labels::COMPONENT => self.component.clone(),
        )
        .increment(1);
    }

    pub fn record_removed(&self) {
        counter!(
            names::POKEMON_REMOVED_TOTAL,
            labels::COMPONENT => self.component.clone(),
        )
        .increment(1);
    }

    /// Record a lookup and which branch resolved it ("no", "id", "name", "miss")
    pub fn record_lookup(&self, resolved_by: &'static str) {
        counter!(
            names::POKEMON_LOOKUPS_TOTAL,
            labels::COMPONENT => self.component.clone(),
            labels::RESOLVED_BY => resolved_by,
        )
        .increment(1);
    }

    pub fn record_store_error(&self, operation: &'static str) {
        counter!(
            names::STORE_ERRORS_TOTAL,
            labels::COMPONENT => self.component.clone(),
            labels::OPERATION => operation,
        )
        .increment(1);
    }
}

/// Seed job metrics
#[derive(Clone)]
pub struct SeedMetrics {
    component: String,
}

impl SeedMetrics {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Record a finished run ("ok" or "failed")
    pub fn record_run(&self, status: &'static str) {
        counter!(
            names::SEED_RUNS_TOTAL,
            labels::COMPONENT => self.component.clone(),
            labels::STATUS => status,
        )
        .increment(1);
    }

    pub fn record_inserted(&self, count: u64) {
        counter!(
            names::SEED_DOCS_INSERTED,
            labels::COMPONENT => self.component.clone(),
        )
        .increment(count);
    }

    pub fn record_duration(&self, duration: Duration) {
        histogram!(
            names::SEED_DURATION,
            labels::COMPONENT => self.component.clone(),
        )
        .record(duration.as_secs_f64());
    }
}

/// Timer guard for automatic latency recording
pub struct LatencyTimer<F>
where
    F: FnOnce(Duration),
{
    start: Instant,
    on_drop: Option<F>,
}

impl<F> LatencyTimer<F>
where
    F: FnOnce(Duration),
{
    /// Start a new timer
    pub fn start(on_drop: F) -> Self {
        Self {
            start: Instant::now(),
            on_drop: Some(on_drop),
        }
    }

    /// Stop timer and record
    pub fn stop(mut self) -> Duration {
        let elapsed = self.start.elapsed();
        if let Some(f) = self.on_drop.take() {
            f(elapsed);
        }
        elapsed
    }
}

impl<F> Drop for LatencyTimer<F>
where
    F: FnOnce(Duration),
{
    fn drop(&mut self) {
        if let Some(f) = self.on_drop.take() {
            f(self.start.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_timer_records_once() {
        let mut calls = 0;
        {
            let timer = LatencyTimer::start(|_| calls += 1);
            std::thread::sleep(Duration::from_millis(5));
            assert!(timer.stop() >= Duration::from_millis(5));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_latency_timer_records_on_drop() {
        let mut recorded = None;
        {
            let _timer = LatencyTimer::start(|d| recorded = Some(d));
        }
        assert!(recorded.is_some());
    }
}
