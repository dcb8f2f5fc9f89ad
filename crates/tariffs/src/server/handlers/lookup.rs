//! Field-level lookups and the tariff calculator

use axum::extract::{Extension, Query, State};
use axum::response::Json;
use std::sync::Arc;

use crate::calculator;
use crate::records::ProductQuery;
use crate::server::{
  middleware::RequestContext,
  types::{
    CalculateParams, CalculateResponse, ErrorBody, FaultBody, HtsLookupParams, HtsLookupResponse,
    ProductSearchParams, ProductSearchResponse, RecordsPage, HTS_NOT_FOUND, NO_PRODUCTS_MESSAGE,
  },
  AppState,
};

/// GET /calculate-tariff
pub async fn calculate_tariff(
  Extension(context): Extension<RequestContext>,
  Query(params): Query<CalculateParams>,
) -> Json<CalculateResponse> {
  match calculator::calculate_tariff(params) {
    Ok(calculation) => Json(CalculateResponse::Calculated(calculation)),
    Err(e) => {
      context.log_warn(&e.to_string(), "calculator-api").await;
      Json(CalculateResponse::Rejected(ErrorBody { error: e.to_string() }))
    }
  }
}

/// GET /hts-lookup - exact code match, first five rows
pub async fn hts_lookup(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  Query(params): Query<HtsLookupParams>,
) -> Json<HtsLookupResponse> {
  let records = state.store.load_async().await.and_then(|_| state.store.by_hts_code(&params.hts_code));

  match records {
    Ok(records) if records.is_empty() => {
      Json(HtsLookupResponse::NotFound(ErrorBody { error: HTS_NOT_FOUND.to_string() }))
    }
    Ok(records) => Json(HtsLookupResponse::Found(RecordsPage::first_page(records))),
    Err(e) => {
      context.log_error(&e.to_string(), "lookup-api").await;
      Json(HtsLookupResponse::Fault(FaultBody::from_error(e)))
    }
  }
}

/// GET /product-search - substring filters, first five rows
pub async fn product_search(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  Query(params): Query<ProductSearchParams>,
) -> Json<ProductSearchResponse> {
  let query = ProductQuery::from(params);

  let records = state.store.load_async().await.and_then(|_| state.store.search(&query));

  match records {
    Ok(records) if records.is_empty() => Json(ProductSearchResponse::Page(RecordsPage {
      count: 0,
      results: Vec::new(),
      message: Some(NO_PRODUCTS_MESSAGE.to_string()),
    })),
    Ok(records) => Json(ProductSearchResponse::Page(RecordsPage::first_page(records))),
    Err(e) => {
      context.log_error(&e.to_string(), "lookup-api").await;
      Json(ProductSearchResponse::Fault(FaultBody::from_error(e)))
    }
  }
}
