//! Text embedding providers
//!
//! The index only knows the [`EmbeddingProvider`] seam. Which concrete model
//! sits behind it is a deployment choice made from [`Settings`].

pub mod openai;

#[cfg(feature = "local-embeddings")]
pub mod onnx;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{EmbeddingBackend, Settings};
use crate::errors::{Result, TariffError};

/// Text to fixed-length vector
///
/// Every failure (missing credential, network, model load) must surface as
/// [`TariffError::EmbeddingUnavailable`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
  /// One vector per input text, in input order
  async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

  /// Vector for a search query
  async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

/// Provider selected by the settings
pub fn build_provider(settings: &Settings) -> Result<Arc<dyn EmbeddingProvider>> {
  match settings.embeddings.provider {
    EmbeddingBackend::Openai => Ok(Arc::new(openai::OpenAiEmbeddings::new(
      &settings.embeddings,
      settings.api_key.clone(),
    )?)),
    #[cfg(feature = "local-embeddings")]
    EmbeddingBackend::Local => {
      let repo = if settings.embeddings.model == crate::config::EmbeddingSettings::default().model {
        onnx::DEFAULT_MODEL_REPO
      } else {
        settings.embeddings.model.as_str()
      };
      Ok(Arc::new(onnx::OnnxEmbeddings::new(repo)))
    }
    #[cfg(not(feature = "local-embeddings"))]
    EmbeddingBackend::Local => Err(TariffError::embedding_unavailable(
      "local embeddings require the `local-embeddings` feature",
    )),
  }
}

/// Fail unless the provider returned exactly one vector per text
pub(crate) fn check_count(expected: usize, vectors: &[Vec<f32>]) -> Result<()> {
  if vectors.len() != expected {
    return Err(TariffError::embedding_unavailable(format!(
      "expected {expected} embeddings, provider returned {}",
      vectors.len()
    )));
  }
  Ok(())
}
