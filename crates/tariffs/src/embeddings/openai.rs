//! OpenAI-compatible embedding client
//!
//! Talks to any server exposing the `/embeddings` route of the OpenAI API.
//! Requests are batched; there is no retry, a failed call fails the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{check_count, EmbeddingProvider};
use crate::config::EmbeddingSettings;
use crate::errors::{Result, TariffError};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
  data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
  embedding: Vec<f32>,
  index: usize,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
  error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
  message: String,
}

pub struct OpenAiEmbeddings {
  client: Client,
  api_key: Option<String>,
  model: String,
  endpoint: String,
  batch_size: usize,
}

impl OpenAiEmbeddings {
  pub fn new(settings: &EmbeddingSettings, api_key: Option<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(settings.timeout_secs))
      .build()
      .map_err(|e| TariffError::embedding_unavailable(format!("HTTP client setup failed: {e}")))?;

    Ok(Self {
      client,
      api_key,
      model: settings.model.clone(),
      endpoint: format!("{}/embeddings", settings.base_url.trim_end_matches('/')),
      batch_size: settings.batch_size.max(1),
    })
  }

  fn api_key(&self) -> Result<&str> {
    self
      .api_key
      .as_deref()
      .ok_or_else(|| TariffError::embedding_unavailable("OPENAI_API_KEY is not set"))
  }

  async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>> {
    let api_key = self.api_key()?;
    let body = EmbeddingRequest { model: &self.model, input };
    tracing::debug!(model = %self.model, inputs = input.len(), "requesting embeddings");

    let response = self
      .client
      .post(&self.endpoint)
      .bearer_auth(api_key)
      .json(&body)
      .send()
      .await
      .map_err(|e| TariffError::embedding_unavailable(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);
      return Err(TariffError::embedding_unavailable(format!("HTTP {status}: {message}")));
    }

    let mut parsed: EmbeddingResponse = response
      .json()
      .await
      .map_err(|e| TariffError::embedding_unavailable(format!("invalid response: {e}")))?;

    parsed.data.sort_by_key(|item| item.index);
    let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|item| item.embedding).collect();
    check_count(input.len(), &vectors)?;
    Ok(vectors)
  }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
  async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(self.batch_size) {
      vectors.extend(self.request(batch).await?);
    }
    Ok(vectors)
  }

  async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
    let mut vectors = self.request(&[text.to_string()]).await?;
    vectors.pop().ok_or_else(|| TariffError::embedding_unavailable("empty embedding response"))
  }
}
