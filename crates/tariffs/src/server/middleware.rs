//! Request context and middleware for the tariffs API
//!
//! Every request gets an id and a handle on the journal. The middleware
//! records start and completion (status and duration) and hands the context
//! to handlers through request extensions.

use axum::{
  extract::{Request, State},
  http::{Method, Uri},
  middleware::Next,
  response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::logging::journal::{Journal, RequestMeta};
use crate::server::AppState;

const COMPONENT: &str = "http-request";

#[derive(Clone)]
pub struct RequestContext {
  pub request_id: Uuid,
  pub method: Method,
  pub uri: Uri,
  pub journal: Journal,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri, journal: Journal) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri, journal }
  }

  fn meta(&self, status_code: Option<u16>, duration_ms: Option<f64>) -> RequestMeta {
    RequestMeta {
      request_id: self.request_id.to_string(),
      method: self.method.to_string(),
      path: self.uri.path().to_string(),
      status_code,
      duration_ms,
    }
  }

  pub async fn log_info(&self, message: &str, component: &str) {
    self.log_with_context(message, "info", component, None, None).await;
  }

  pub async fn log_success(&self, message: &str, component: &str) {
    self.log_with_context(message, "success", component, None, None).await;
  }

  pub async fn log_warn(&self, message: &str, component: &str) {
    self.log_with_context(message, "warn", component, None, None).await;
  }

  pub async fn log_error(&self, message: &str, component: &str) {
    self.log_with_context(message, "error", component, None, None).await;
  }

  pub async fn log_with_context(
    &self,
    message: &str,
    level: &str,
    component: &str,
    status_code: Option<u16>,
    duration_ms: Option<f64>,
  ) {
    let line = format!("[{}] {} {} - {message}", self.request_id, self.method, self.uri.path());
    self.journal.record(level, &line, component, Some(self.meta(status_code, duration_ms))).await;
  }

  pub async fn log_request_start(&self) {
    self.log_with_context("Request started", "verbose", COMPONENT, None, None).await;
  }

  pub async fn log_request_complete(&self, status_code: u16, duration_ms: f64) {
    let message = format!("Request completed ({status_code}, {duration_ms:.2}ms)");
    self.log_with_context(&message, "info", COMPONENT, Some(status_code), Some(duration_ms)).await;
  }
}

/// Inject a [`RequestContext`] into every request and journal its outcome
pub async fn request_context_middleware(
  State(state): State<Arc<AppState>>,
  mut request: Request,
  next: Next,
) -> Response {
  let context =
    RequestContext::new(request.method().clone(), request.uri().clone(), state.journal.clone());

  let start_time = Instant::now();
  context.log_request_start().await;

  request.extensions_mut().insert(context.clone());
  let response = next.run(request).await;

  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
  context.log_request_complete(response.status().as_u16(), duration_ms).await;

  response
}
