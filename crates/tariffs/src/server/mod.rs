//! HTTP API for the tariff dataset
//!
//! Routes are thin: each handler calls into the library and maps the outcome
//! onto one of the body shapes in [`types`].

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod startup;
pub mod types;

use std::sync::Arc;

use crate::embeddings::EmbeddingProvider;
use crate::index::EmbeddingIndex;
use crate::logging::journal::Journal;
use crate::materials::MaterialOptimizer;
use crate::records::RecordStore;
use crate::resolver::SemanticResolver;
use crate::scenarios::ScenarioEngine;

/// Services shared by every request
pub struct AppState {
  pub store: Arc<RecordStore>,
  pub index: Arc<EmbeddingIndex>,
  pub resolver: SemanticResolver,
  pub scenarios: ScenarioEngine,
  pub materials: MaterialOptimizer,
  pub journal: Journal,
}

impl AppState {
  pub fn new(store: Arc<RecordStore>, provider: Arc<dyn EmbeddingProvider>, journal: Journal) -> Self {
    let index = Arc::new(EmbeddingIndex::new(store.clone(), provider));
    Self {
      resolver: SemanticResolver::new(index.clone()),
      scenarios: ScenarioEngine::new(store.clone()),
      materials: MaterialOptimizer::new(store.clone()),
      store,
      index,
      journal,
    }
  }
}
