//! Liveness endpoint

use axum::response::Json;

use crate::server::types::HealthResponse;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
  Json(HealthResponse { status: "ok".to_string() })
}
