//! Journal endpoint

use axum::extract::{Extension, Query};
use axum::response::Json;

use crate::server::{
  middleware::RequestContext,
  types::{FaultBody, LogsParams, LogsResponse},
};

/// GET /logs - most recent journal entries, oldest first
pub async fn get_logs(
  Extension(context): Extension<RequestContext>,
  Query(params): Query<LogsParams>,
) -> Json<LogsResponse> {
  match context.journal.entries(Some(params.limit), Some(&params.level)).await {
    Ok(logs) => Json(LogsResponse::Logs { logs }),
    Err(e) => {
      context.log_error(&format!("Failed to read logs: {e}"), "logs-api").await;
      Json(LogsResponse::Fault(FaultBody::from_error(e)))
    }
  }
}
