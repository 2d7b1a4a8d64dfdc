//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use persistence::entities::LocationEntity;
use persistence::metrics::record_pool_metrics;
use persistence::Filter;
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: StorageHealth,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageHealth {
    /// `postgres` or `memory`.
    pub backend: String,
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Simple status response for liveness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Liveness plus a storage round trip.
///
/// GET /api/health
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();
    let connected = state
        .uow
        .repository::<LocationEntity>()
        .count(Filter::all())
        .await
        .is_ok();
    let latency_ms = start.elapsed().as_millis() as u64;

    let backend = match state.uow.pool() {
        Some(pool) => {
            record_pool_metrics(pool);
            "postgres"
        }
        None => "memory",
    };

    let response = HealthResponse {
        status: if connected { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: StorageHealth {
            backend: backend.to_string(),
            connected,
            latency_ms: connected.then_some(latency_ms),
        },
    };

    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Returns 200 OK while the process is running.
///
/// GET /api/health/live
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}
