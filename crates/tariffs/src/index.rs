//! Embedding index over product descriptions
//!
//! The index embeds every record's description once, on the first semantic
//! query, and keeps the pairing of records and vectors for the rest of the
//! process. It never notices later changes to the table. Concurrent first
//! queries share a single build; a failed build leaves the index empty so the
//! next query tries again.

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::embeddings::{check_count, EmbeddingProvider};
use crate::errors::Result;
use crate::records::{Record, RecordStore};
use crate::similarity::cosine_similarity;

/// Records and their vectors, index-aligned
#[derive(Debug)]
pub struct IndexSnapshot {
  pub records: Arc<Vec<Record>>,
  pub vectors: Vec<Vec<f32>>,
}

pub struct EmbeddingIndex {
  store: Arc<RecordStore>,
  provider: Arc<dyn EmbeddingProvider>,
  snapshot: OnceCell<Arc<IndexSnapshot>>,
}

impl EmbeddingIndex {
  pub fn new(store: Arc<RecordStore>, provider: Arc<dyn EmbeddingProvider>) -> Self {
    Self { store, provider, snapshot: OnceCell::new() }
  }

  pub fn is_built(&self) -> bool {
    self.snapshot.initialized()
  }

  /// The cached snapshot, building it on first use
  pub async fn ensure_built(&self) -> Result<Arc<IndexSnapshot>> {
    self.snapshot.get_or_try_init(|| self.build()).await.cloned()
  }

  async fn build(&self) -> Result<Arc<IndexSnapshot>> {
    let records = self.store.load_async().await?;
    let descriptions: Vec<String> =
      records.iter().map(|record| record.product_description.clone()).collect();

    crate::verbose!(&format!("Embedding {} product descriptions", descriptions.len()));
    let vectors = if descriptions.is_empty() {
      Vec::new()
    } else {
      self.provider.embed_documents(&descriptions).await?
    };
    check_count(records.len(), &vectors)?;

    crate::success!(&format!("Embedding index built over {} records", records.len()));
    Ok(Arc::new(IndexSnapshot { records, vectors }))
  }

  /// Nearest records to `text` by cosine similarity, best first
  ///
  /// Equal scores keep table order. Returns at most `top_n` entries, none when
  /// `top_n` is zero or negative.
  pub async fn query(&self, text: &str, top_n: i64) -> Result<Vec<(Record, f32)>> {
    if top_n <= 0 {
      return Ok(Vec::new());
    }

    let snapshot = self.ensure_built().await?;
    let query_vector = self.provider.embed_query(text).await?;

    let mut scored: Vec<(usize, f32)> = snapshot
      .vectors
      .iter()
      .enumerate()
      .map(|(position, vector)| (position, cosine_similarity(&query_vector, vector)))
      .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(usize::try_from(top_n).unwrap_or(usize::MAX));

    Ok(
      scored
        .into_iter()
        .map(|(position, score)| (snapshot.records[position].clone(), score))
        .collect(),
    )
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::embeddings::MockEmbeddingProvider;
  use crate::errors::TariffError;
  use crate::records::tests::SAMPLE_CSV;
  use async_trait::async_trait;
  use std::sync::atomic::{AtomicUsize, Ordering};

  const VOCABULARY: [&str; 5] = ["glove", "cotton", "nitrile", "leather", "shoe"];

  /// Bag-of-keywords vectors, enough to make rankings predictable
  #[derive(Default)]
  pub(crate) struct KeywordEmbeddings {
    pub(crate) document_calls: AtomicUsize,
  }

  impl KeywordEmbeddings {
    fn vector(text: &str) -> Vec<f32> {
      let lower = text.to_lowercase();
      VOCABULARY.iter().map(|word| lower.matches(word).count() as f32).collect()
    }
  }

  #[async_trait]
  impl EmbeddingProvider for KeywordEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
      self.document_calls.fetch_add(1, Ordering::SeqCst);
      tokio::task::yield_now().await;
      Ok(texts.iter().map(|text| Self::vector(text)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
      Ok(Self::vector(text))
    }
  }

  pub(crate) fn sample_store() -> Arc<RecordStore> {
    let mut reader = csv::Reader::from_reader(SAMPLE_CSV.as_bytes());
    let records = reader.deserialize().collect::<std::result::Result<Vec<Record>, _>>().unwrap();
    Arc::new(RecordStore::from_records(records))
  }

  pub(crate) fn keyword_index() -> EmbeddingIndex {
    EmbeddingIndex::new(sample_store(), Arc::new(KeywordEmbeddings::default()))
  }

  #[tokio::test]
  async fn test_query_ranks_by_similarity() -> anyhow::Result<()> {
    let index = keyword_index();
    let results = index.query("cotton gloves", 3).await?;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0.product_description, "Cotton Work Gloves");
    assert_eq!(results[1].0.product_description, "Nitrile Exam Gloves");
    assert_eq!(results[2].0.product_description, "Leather Shoes");
    assert!(results.windows(2).all(|pair| pair[0].1 >= pair[1].1));
    Ok(())
  }

  #[tokio::test]
  async fn test_ties_keep_table_order() -> anyhow::Result<()> {
    let index = keyword_index();
    let results = index.query("gloves", 2).await?;

    assert_eq!(results[0].1, results[1].1);
    assert_eq!(results[0].0.product_description, "Cotton Work Gloves");
    assert_eq!(results[1].0.product_description, "Nitrile Exam Gloves");
    Ok(())
  }

  #[tokio::test]
  async fn test_top_n_bounds() -> anyhow::Result<()> {
    let index = keyword_index();

    assert_eq!(index.query("gloves", 1).await?.len(), 1);
    assert_eq!(index.query("gloves", 50).await?.len(), 3);
    assert!(index.query("gloves", 0).await?.is_empty());
    assert!(index.query("gloves", -4).await?.is_empty());
    Ok(())
  }

  #[tokio::test]
  async fn test_concurrent_first_queries_build_once() -> anyhow::Result<()> {
    let provider = Arc::new(KeywordEmbeddings::default());
    let index = EmbeddingIndex::new(sample_store(), provider.clone());

    let (first, second) = futures::join!(index.query("gloves", 3), index.query("shoes", 3));
    first?;
    second?;
    index.query("leather", 1).await?;

    assert_eq!(provider.document_calls.load(Ordering::SeqCst), 1);
    assert!(index.is_built());
    Ok(())
  }

  #[tokio::test]
  async fn test_failed_build_is_reported_and_retried() {
    let mut provider = MockEmbeddingProvider::new();
    provider
      .expect_embed_documents()
      .times(2)
      .returning(|_| Err(TariffError::embedding_unavailable("OPENAI_API_KEY is not set")));
    provider.expect_embed_query().never();

    let index = EmbeddingIndex::new(sample_store(), Arc::new(provider));

    for _ in 0..2 {
      let err = index.query("gloves", 3).await.unwrap_err();
      assert!(matches!(err, TariffError::EmbeddingUnavailable(_)));
    }
    assert!(!index.is_built());
  }

  #[tokio::test]
  async fn test_vector_count_mismatch_is_unavailable() {
    let mut provider = MockEmbeddingProvider::new();
    provider.expect_embed_documents().returning(|_| Ok(vec![vec![1.0]]));

    let index = EmbeddingIndex::new(sample_store(), Arc::new(provider));
    assert!(matches!(index.ensure_built().await, Err(TariffError::EmbeddingUnavailable(_))));
  }

  #[tokio::test]
  async fn test_empty_table_builds_without_calling_provider() -> anyhow::Result<()> {
    let mut provider = MockEmbeddingProvider::new();
    provider.expect_embed_documents().never();
    provider.expect_embed_query().returning(|_| Ok(vec![1.0]));

    let index = EmbeddingIndex::new(Arc::new(RecordStore::from_records(Vec::new())), Arc::new(provider));
    assert!(index.query("anything", 3).await?.is_empty());
    Ok(())
  }
}
