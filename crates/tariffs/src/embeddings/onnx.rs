//! In-process sentence embeddings via ONNX Runtime
//!
//! Model and tokenizer are fetched from the HuggingFace hub on first use and
//! kept for the life of the process. Output is mean-pooled and normalised so
//! cosine scores are comparable with the remote provider's.

use anyhow::anyhow;
use async_trait::async_trait;
use hf_hub::api::tokio::Api;
use ndarray::Array2;
use ort::{
  execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch},
  session::Session,
  value::Value,
};
use std::collections::HashMap;
use tokenizers::Tokenizer;
use tokio::sync::{Mutex, OnceCell};

use super::EmbeddingProvider;
use crate::errors::{Result, TariffError};
use crate::similarity::{mean_pool, normalize};

/// Used when the settings still name the remote default model
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

const TOKENIZER_FILE: &str = "tokenizer.json";
const MODEL_FILE: &str = "onnx/model.onnx";

struct EmbeddingModel {
  session: Session,
  tokenizer: Tokenizer,
}

#[cfg(not(tarpaulin_include))]
impl EmbeddingModel {
  async fn load(repo_name: &str) -> anyhow::Result<Self> {
    crate::info!(&format!("Loading embedding model {repo_name}..."));

    let api = Api::new().map_err(|e| anyhow!("HF API initialization failed: {e}"))?;
    let repo = api.model(repo_name.to_string());

    let tokenizer_file =
      repo.get(TOKENIZER_FILE).await.map_err(|e| anyhow!("Failed to download tokenizer: {e}"))?;
    let model_path =
      repo.get(MODEL_FILE).await.map_err(|e| anyhow!("Failed to download ONNX model: {e}"))?;

    let tokenizer =
      Tokenizer::from_file(tokenizer_file).map_err(|e| anyhow!("Failed to load tokenizer: {e}"))?;

    let providers: Vec<ExecutionProviderDispatch> = vec![CPUExecutionProvider::default().into()];
    let session =
      Session::builder()?.with_execution_providers(providers)?.commit_from_file(model_path)?;

    crate::success!("Embedding model ready");
    Ok(Self { session, tokenizer })
  }

  fn embed(&mut self, text: &str) -> anyhow::Result<Vec<f32>> {
    let encoding =
      self.tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {e}"))?;

    let mut input: HashMap<String, Value> = HashMap::new();
    input.insert("input_ids".to_string(), to_tensor(encoding.get_ids())?);
    input.insert("attention_mask".to_string(), to_tensor(encoding.get_attention_mask())?);

    let expects_type_ids = self.session.inputs.iter().any(|i| i.name == "token_type_ids");
    if expects_type_ids {
      input.insert("token_type_ids".to_string(), to_tensor(encoding.get_type_ids())?);
    }

    let output = self.session.run(input)?;
    let tensor = output
      .get("last_hidden_state")
      .or_else(|| output.get("0"))
      .ok_or_else(|| anyhow!("No output found from model - expected 'last_hidden_state' or '0'"))?;

    let (shape, data) = tensor.try_extract_tensor::<f32>()?;
    Ok(normalize(mean_pool(shape.as_ref(), data)))
  }
}

fn to_tensor(values: &[u32]) -> anyhow::Result<Value> {
  let ids: Vec<i64> = values.iter().map(|&v| v as i64).collect();
  let array: Array2<i64> = Array2::from_shape_vec((1, ids.len()), ids)?;
  Ok(Value::from_array(array)?.into())
}

/// Local ONNX provider; the model loads lazily on the first embedding call
pub struct OnnxEmbeddings {
  repo_name: String,
  model: OnceCell<Mutex<EmbeddingModel>>,
}

impl OnnxEmbeddings {
  pub fn new(repo_name: &str) -> Self {
    Self { repo_name: repo_name.to_string(), model: OnceCell::new() }
  }

  async fn model(&self) -> Result<&Mutex<EmbeddingModel>> {
    self
      .model
      .get_or_try_init(|| async {
        EmbeddingModel::load(&self.repo_name)
          .await
          .map(Mutex::new)
          .map_err(TariffError::embedding_unavailable)
      })
      .await
  }

  async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
    let mut model = self.model().await?.lock().await;
    model.embed(text).map_err(TariffError::embedding_unavailable)
  }
}

#[async_trait]
impl EmbeddingProvider for OnnxEmbeddings {
  async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let mut vectors = Vec::with_capacity(texts.len());
    for text in texts {
      vectors.push(self.embed_one(text).await?);
    }
    Ok(vectors)
  }

  async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
    self.embed_one(text).await
  }
}
