//! Scenario simulation and material optimization by product name
//!
//! Faults on these two routes are reported as a `{message}` body, not as
//! `{error, trace}`.

use axum::extract::{Extension, Query, State};
use axum::response::Json;
use std::sync::Arc;

use crate::materials::MaterialOutcome;
use crate::scenarios::{sort_and_truncate, SimulationOutcome, SortDirection};
use crate::server::{
  middleware::RequestContext,
  types::{
    MaterialParams, MaterialResponse, MessageBody, ScenarioParams, ScenarioResponse,
    NO_DATA_MESSAGE, NO_SUGGESTIONS_MESSAGE,
  },
  AppState,
};

/// GET /scenario-simulation
pub async fn scenario_simulation(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  Query(params): Query<ScenarioParams>,
) -> Json<ScenarioResponse> {
  let outcome = state.store.load_async().await.and_then(|_| {
    state.scenarios.simulate(
      &params.product_name,
      params.alt_material.as_deref(),
      params.alt_country.as_deref(),
    )
  });

  match outcome {
    Ok(SimulationOutcome::Scenarios(scenarios)) => {
      let direction = SortDirection::from(params.direction.as_str());
      Json(ScenarioResponse::Scenarios {
        scenarios: sort_and_truncate(scenarios, &params.sort_by, direction),
      })
    }
    Ok(SimulationOutcome::NoData) => Json(ScenarioResponse::Message(MessageBody::new(NO_DATA_MESSAGE))),
    Err(e) => {
      context.log_error(&format!("Scenario simulation failed: {e}"), "scenario-api").await;
      Json(ScenarioResponse::Message(MessageBody::internal(e)))
    }
  }
}

/// GET /material-optimization
pub async fn material_optimization(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  Query(params): Query<MaterialParams>,
) -> Json<MaterialResponse> {
  let outcome = state
    .store
    .load_async()
    .await
    .and_then(|_| state.materials.suggest_materials(&params.product_name, params.hts_code.as_deref()));

  match outcome {
    Ok(MaterialOutcome::Suggestions(suggestions)) => Json(MaterialResponse::Suggestions { suggestions }),
    Ok(MaterialOutcome::NoData) => Json(MaterialResponse::Message(MessageBody::new(NO_DATA_MESSAGE))),
    Ok(MaterialOutcome::NoSuggestions) => {
      Json(MaterialResponse::Message(MessageBody::new(NO_SUGGESTIONS_MESSAGE)))
    }
    Err(e) => {
      context.log_error(&format!("Material optimization failed: {e}"), "materials-api").await;
      Json(MaterialResponse::Message(MessageBody::internal(e)))
    }
  }
}
