//! REST server startup and configuration

use anyhow::{Context, Result};
use axum::serve;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{EmbeddingBackend, Settings, API_KEY_ENV};
use crate::embeddings::build_provider;
use crate::logging::journal::Journal;
use crate::records::RecordStore;
use crate::server::{routing::create_router, AppState};

const COMPONENT: &str = "tariffs-server";

/// Build the shared state described by `settings`
pub fn build_state(settings: &Settings, journal: Journal) -> Result<AppState> {
  let store = Arc::new(RecordStore::new(&settings.data_path));
  let provider = build_provider(settings)?;
  Ok(AppState::new(store, provider, journal))
}

/// Start the REST server and run until it stops
pub async fn start_server(settings: Settings) -> Result<()> {
  let logs_path = settings.resolved_logs_path();
  let journal = Journal::open(&logs_path)
    .with_context(|| format!("Failed to open request journal at {}", logs_path.display()))?;

  journal.info(&format!("Starting tariffs REST server on {}", settings.bind), COMPONENT).await;

  if !settings.data_path.exists() {
    journal
      .warn(&format!("Tariff data not found at {}", settings.data_path.display()), COMPONENT)
      .await;
  }
  if settings.embeddings.provider == EmbeddingBackend::Openai && settings.api_key.is_none() {
    journal.warn(&format!("{API_KEY_ENV} is not set; semantic endpoints will fail"), COMPONENT).await;
  }

  let state = Arc::new(build_state(&settings, journal.clone())?);
  let app = create_router(state)
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(settings.bind)
    .await
    .with_context(|| format!("Failed to bind {}", settings.bind))?;
  journal.success(&format!("Server listening on {}", settings.bind), COMPONENT).await;

  match serve(listener, app).await {
    Ok(()) => {
      journal.info("Server shutdown gracefully", COMPONENT).await;
      Ok(())
    }
    Err(e) => {
      journal.error(&format!("Server error: {e}"), COMPONENT).await;
      Err(anyhow::anyhow!("Server error: {e}"))
    }
  }
}
