//! Admin API for Pokedex

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use pokedex_core::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Admin API state
#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<dyn PokemonStore>,
}

/// Health response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Stats response
#[derive(Serialize)]
pub struct StatsResponse {
    pub documents: u64,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn live() -> &'static str {
    "OK"
}

async fn ready(State(state): State<AdminState>) -> (StatusCode, &'static str) {
    match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            warn!(error = %e, component = state.store.component_name(), "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
        }
    }
}

async fn stats(
    State(state): State<AdminState>,
) -> std::result::Result<Json<StatsResponse>, (StatusCode, String)> {
    let documents = state.store.count().await.map_err(|e| {
        warn!(error = %e, "Failed to count documents");
        (StatusCode::INTERNAL_SERVER_ERROR, "store unavailable".to_string())
    })?;
    Ok(Json(StatsResponse { documents }))
}

/// Build the admin router
pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
        .route("/stats", get(stats))
        .with_state(state)
}

/// Run admin server until Ctrl-C
pub async fn run_admin_server(listen: String, state: AdminState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .map_err(|e| PokedexError::config(format!("Failed to bind {}: {}", listen, e)))?;
    info!(listen, "Admin API started");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .map_err(|e| PokedexError::Internal(format!("Admin API failed: {}", e)))
}
