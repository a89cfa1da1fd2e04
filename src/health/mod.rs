/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`) - process is up and serving
 * - Liveness check (`/health/live`) - process is alive, with uptime
 * - Readiness check (`/health/ready`) - the store answers a ping
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, error};

use crate::AppState;

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReadinessReport {
    pub ready: bool,
    pub database: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Records the process start; later calls are no-ops.
pub fn mark_started() {
    STARTED_AT.get_or_init(Instant::now);
}

fn uptime_seconds() -> u64 {
    STARTED_AT.get().map_or(0, |start| start.elapsed().as_secs())
}

/// Basic health check endpoint
pub async fn health_check() -> impl IntoResponse {
    debug!("Health check endpoint called");
    (
        StatusCode::OK,
        Json(HealthReport {
            status: HealthStatus::Up,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }),
    )
}

/// Liveness check endpoint
pub async fn liveness_check() -> impl IntoResponse {
    debug!("Liveness check endpoint called");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "alive": true,
            "uptime_seconds": uptime_seconds(),
            "timestamp": Utc::now(),
        })),
    )
}

/// Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match crate::db::check_connection(state.db.as_ref()).await {
        Ok(()) => HealthStatus::Up,
        Err(e) => {
            error!("Database health check failed: {}", e);
            HealthStatus::Down
        }
    };

    let status_code = match database {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status_code,
        Json(ReadinessReport {
            ready: database == HealthStatus::Up,
            database,
            timestamp: Utc::now(),
        }),
    )
}

/// Health endpoints, nested under `/health`
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness_check))
        .route("/ready", get(readiness_check))
}
