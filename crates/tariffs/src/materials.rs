//! Material optimization suggestions
//!
//! Surfaces the material mixes of matching records, best potential savings
//! first. Records without a composition are skipped.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::Result;
use crate::records::{filters, RecordStore};

pub const SUGGESTION_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSuggestion {
  pub materials: String,
  pub primary_material: String,
  pub potential_savings_usd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialOutcome {
  Suggestions(Vec<MaterialSuggestion>),
  /// Nothing matched the product (and HTS code)
  NoData,
  /// Matches exist but none has a material composition
  NoSuggestions,
}

pub struct MaterialOptimizer {
  store: Arc<RecordStore>,
}

impl MaterialOptimizer {
  pub fn new(store: Arc<RecordStore>) -> Self {
    Self { store }
  }

  pub fn suggest_materials(&self, product_name: &str, hts_code: Option<&str>) -> Result<MaterialOutcome> {
    let hts_code = hts_code.filter(|code| !code.is_empty());
    let matches = self.store.filter(|record| {
      filters::description_contains(record, product_name)
        && hts_code.map_or(true, |code| filters::hts_equals(record, code))
    })?;

    if matches.is_empty() {
      return Ok(MaterialOutcome::NoData);
    }

    let mut suggestions: Vec<MaterialSuggestion> = matches
      .iter()
      .filter_map(|record| {
        record.material_composition.as_ref().map(|composition| MaterialSuggestion {
          materials: composition.clone(),
          primary_material: record.primary_material.clone(),
          potential_savings_usd: record.potential_savings_usd,
        })
      })
      .collect();

    if suggestions.is_empty() {
      return Ok(MaterialOutcome::NoSuggestions);
    }

    suggestions.sort_by(|a, b| {
      let savings = |s: &MaterialSuggestion| s.potential_savings_usd.unwrap_or(0.0);
      savings(b).total_cmp(&savings(a))
    });
    suggestions.truncate(SUGGESTION_LIMIT);
    Ok(MaterialOutcome::Suggestions(suggestions))
  }
}
