//! Free-text query to matching records

use std::sync::Arc;

use crate::errors::Result;
use crate::index::EmbeddingIndex;
use crate::records::Record;

pub struct SemanticResolver {
  index: Arc<EmbeddingIndex>,
}

impl SemanticResolver {
  pub fn new(index: Arc<EmbeddingIndex>) -> Self {
    Self { index }
  }

  /// Best matching records for `text`, in ranking order
  pub async fn resolve(&self, text: &str, top_n: i64) -> Result<Vec<Record>> {
    let ranked = self.index.query(text, top_n).await?;
    Ok(ranked.into_iter().map(|(record, _score)| record).collect())
  }
}
