//! `GET /health` backed by a store round-trip.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::DbClient;

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    /// `UP` or `DOWN`
    pub status: &'static str,
}

/// Router exposing `GET /health`: 200 `UP` when the store answers, 503 `DOWN` otherwise.
pub fn health_routes(db_client: DbClient) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(db_client)
}

#[axum::debug_handler]
async fn health_handler(State(db_client): State<DbClient>) -> impl IntoResponse {
    if db_client.is_healthy().await {
        (StatusCode::OK, Json(HealthResponse { status: "UP" }))
    } else {
        warn!("Health check failed: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "DOWN" }),
        )
    }
}
