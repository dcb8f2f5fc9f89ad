//! Vector math shared by the embedding index and the local embedding model

/// Cosine similarity in [-1, 1]
///
/// Mismatched dimensions, empty vectors and zero vectors score 0.0 rather
/// than failing, so one bad row never aborts a whole ranking.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() {
    crate::warn!(&format!("Embedding dimension mismatch: {} vs {}", a.len(), b.len()));
    return 0.0;
  }

  if a.is_empty() {
    return 0.0;
  }

  let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
  let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
  let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

  if norm_a == 0.0 || norm_b == 0.0 {
    return 0.0;
  }

  dot_product / (norm_a * norm_b)
}

/// Mean pooling over the sequence dimension of a `[batch, seq, hidden]` tensor
pub fn mean_pool(shape: &[i64], data: &[f32]) -> Vec<f32> {
  if shape.len() < 3 {
    return Vec::new();
  }

  let seq_length = shape[1] as usize;
  let hidden_size = shape[2] as usize;

  let mut pooled = vec![0.0f32; hidden_size];
  if seq_length == 0 {
    return pooled;
  }

  for token_idx in 0..seq_length {
    let start = token_idx * hidden_size;
    for (i, &value) in data[start..start + hidden_size].iter().enumerate() {
      pooled[i] += value;
    }
  }

  for value in pooled.iter_mut() {
    *value /= seq_length as f32;
  }

  pooled
}

/// Scale to unit length; zero vectors are returned unchanged
pub fn normalize(mut embedding: Vec<f32>) -> Vec<f32> {
  let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

  if magnitude < f32::EPSILON {
    return embedding;
  }

  for value in embedding.iter_mut() {
    *value /= magnitude;
  }

  embedding
}
