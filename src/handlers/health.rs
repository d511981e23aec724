//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Readiness response with dependency status
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: bool,
    pub redis: bool,
    pub timestamp: String,
}

/// Liveness endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Readiness endpoint: fails when the database is unreachable
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match state.database.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database readiness check failed");
            false
        }
    };
    let redis = state.services.redis_service.health_check().await;

    let (code, status) = match (database, redis) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        (true, false) => (StatusCode::OK, "degraded"),
        (true, true) => (StatusCode::OK, "ready"),
    };

    (
        code,
        Json(ReadinessResponse {
            status,
            database,
            redis,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}
