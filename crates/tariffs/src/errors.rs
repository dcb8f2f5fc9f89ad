//! Error taxonomy for the tariff core
//!
//! "Nothing matched" is deliberately absent here. Empty outcomes are modelled
//! as their own variants next to the operation that produces them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TariffError {
  #[error("Tariff data not available at {path}: {reason}")]
  DataUnavailable { path: PathBuf, reason: String },

  #[error("Embedding service unavailable: {0}")]
  EmbeddingUnavailable(String),

  #[error("Quantity cannot be zero.")]
  InvalidQuantity,
}

pub type Result<T> = std::result::Result<T, TariffError>;

impl TariffError {
  pub fn data_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
    Self::DataUnavailable { path: path.into(), reason: reason.to_string() }
  }

  pub fn embedding_unavailable(reason: impl ToString) -> Self {
    Self::EmbeddingUnavailable(reason.to_string())
  }
}
