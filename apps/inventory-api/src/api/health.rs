//! Health check endpoints

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use domain_inventory::StorageKey;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ReadyResponse {
    ready: bool,
    persistent: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: state.config.app.name,
        version: state.config.app.version,
    })
}

/// Ready once the store answers a read
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let readable = state
        .store
        .get::<serde_json::Value>(StorageKey::Settings)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Store not readable"))
        .is_ok();

    let status = if readable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ReadyResponse {
            ready: readable,
            persistent: state.store.is_persistent(),
        }),
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state)
}
