//! Axum router configuration for all endpoints

use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::server::handlers::{logs, lookup, semantic, simulation, status};
use crate::server::middleware::request_context_middleware;
use crate::server::AppState;

/// Create the application router over shared state
pub fn create_router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(status::health))
    .route("/logs", get(logs::get_logs))
    // Direct lookups
    .route("/calculate-tariff", get(lookup::calculate_tariff))
    .route("/hts-lookup", get(lookup::hts_lookup))
    .route("/product-search", get(lookup::product_search))
    // Simulation by product name
    .route("/material-optimization", get(simulation::material_optimization))
    .route("/scenario-simulation", get(simulation::scenario_simulation))
    // Embedding-backed
    .route("/smart-product-search", get(semantic::smart_product_search))
    .route("/semantic-scenario-simulation", get(semantic::semantic_scenario_simulation))
    .route("/semantic-tariff-lookup", get(semantic::semantic_tariff_lookup))
    .layer(middleware::from_fn_with_state(state.clone(), request_context_middleware))
    .with_state(state)
}
