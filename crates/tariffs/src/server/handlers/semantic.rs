//! Endpoints backed by the embedding index
//!
//! The first call builds the index, so it may be slow. Embedding failures,
//! a missing API key included, come back as `{error, trace}`.

use axum::extract::{Extension, Query, State};
use axum::response::Json;
use std::sync::Arc;

use crate::scenarios::{sort_and_truncate, SemanticSimulation, SortDirection};
use crate::server::{
  middleware::RequestContext,
  types::{
    FaultBody, MessageBody, ScenarioResponse, SemanticLookupResponse, SemanticQueryParams,
    SemanticScenarioParams, SmartSearchResponse, TariffMatch, NO_SEMANTIC_MATCH_MESSAGE,
  },
  AppState,
};

const COMPONENT: &str = "semantic-api";

async fn fault(context: &RequestContext, error: crate::errors::TariffError) -> FaultBody {
  context.log_error(&error.to_string(), COMPONENT).await;
  FaultBody::from_error(error)
}

/// GET /smart-product-search
pub async fn smart_product_search(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  Query(params): Query<SemanticQueryParams>,
) -> Json<SmartSearchResponse> {
  match state.resolver.resolve(&params.query, params.top_n).await {
    Ok(results) => Json(SmartSearchResponse::Results { results }),
    Err(e) => Json(SmartSearchResponse::Fault(fault(&context, e).await)),
  }
}

/// GET /semantic-scenario-simulation
pub async fn semantic_scenario_simulation(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  Query(params): Query<SemanticScenarioParams>,
) -> Json<ScenarioResponse> {
  let outcome = state.scenarios.simulate_semantic(&state.resolver, &params.query, params.top_n).await;

  match outcome {
    Ok(SemanticSimulation::Scenarios(merged)) => {
      let direction = SortDirection::from(params.direction.as_str());
      Json(ScenarioResponse::Scenarios { scenarios: sort_and_truncate(merged, &params.sort_by, direction) })
    }
    Ok(SemanticSimulation::NoMatches) => {
      Json(ScenarioResponse::Message(MessageBody::new(NO_SEMANTIC_MATCH_MESSAGE)))
    }
    Err(e) => Json(ScenarioResponse::Fault(fault(&context, e).await)),
  }
}

/// GET /semantic-tariff-lookup
pub async fn semantic_tariff_lookup(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  Query(params): Query<SemanticQueryParams>,
) -> Json<SemanticLookupResponse> {
  match state.resolver.resolve(&params.query, params.top_n).await {
    Ok(records) => Json(SemanticLookupResponse::Matches {
      matches: records.into_iter().map(TariffMatch::from).collect(),
    }),
    Err(e) => Json(SemanticLookupResponse::Fault(fault(&context, e).await)),
  }
}
