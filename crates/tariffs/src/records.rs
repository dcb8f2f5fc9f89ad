//! Tariff records and the process-wide record store
//!
//! The dataset is a flat CSV table loaded wholesale on first access and kept
//! for the lifetime of the process. Records are never mutated after load;
//! callers get a shared snapshot and derive copies from it.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{Result, TariffError};

/// One trade/tariff observation, keyed by the dataset's column names
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
  #[serde(rename = "Product_Description", default)]
  pub product_description: String,

  /// Compared as a string so leading zeros survive
  #[serde(rename = "HTS_Code", default)]
  pub hts_code: String,

  #[serde(rename = "Country_of_Origin", default)]
  pub country_of_origin: String,

  #[serde(rename = "Alternative_Country", default)]
  pub alternative_country: String,

  #[serde(rename = "Material_Composition", default)]
  pub material_composition: Option<String>,

  #[serde(rename = "Primary_Material", default)]
  pub primary_material: String,

  #[serde(rename = "Material_Cost_USD", default)]
  pub material_cost_usd: Option<f64>,

  #[serde(rename = "Tariff_Rate_Percent", default)]
  pub tariff_rate_percent: Option<f64>,

  #[serde(rename = "Landed_Cost_USD", default)]
  pub landed_cost_usd: Option<f64>,

  #[serde(rename = "Potential_Savings_USD", default)]
  pub potential_savings_usd: Option<f64>,

  #[serde(rename = "Company", default)]
  pub company: String,
}

impl Record {
  /// Savings from switching to the alternative country, zero when absent
  pub fn savings_or_zero(&self) -> f64 {
    self.potential_savings_usd.unwrap_or(0.0)
  }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Row predicates shared by the endpoints and the engines
pub mod filters {
  use super::{contains_ignore_case, Record};

  pub fn description_contains(record: &Record, needle: &str) -> bool {
    contains_ignore_case(&record.product_description, needle)
  }

  pub fn company_contains(record: &Record, needle: &str) -> bool {
    contains_ignore_case(&record.company, needle)
  }

  pub fn origin_contains(record: &Record, needle: &str) -> bool {
    contains_ignore_case(&record.country_of_origin, needle)
  }

  pub fn hts_equals(record: &Record, code: &str) -> bool {
    record.hts_code == code
  }
}

/// Optional substring filters for product search; empty strings are ignored
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
  pub product_name: String,
  pub company_name: String,
  pub country_of_origin: String,
}

impl ProductQuery {
  pub fn matches(&self, record: &Record) -> bool {
    (self.product_name.is_empty() || filters::description_contains(record, &self.product_name))
      && (self.company_name.is_empty() || filters::company_contains(record, &self.company_name))
      && (self.country_of_origin.is_empty()
        || filters::origin_contains(record, &self.country_of_origin))
  }
}

/// Read a tariff table from CSV
pub fn load_csv(path: &Path) -> Result<Vec<Record>> {
  if !path.exists() {
    return Err(TariffError::data_unavailable(path, "file not found"));
  }

  let mut reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .from_path(path)
    .map_err(|e| TariffError::data_unavailable(path, e))?;

  reader
    .deserialize::<Record>()
    .enumerate()
    .map(|(row, result)| {
      result.map_err(|e| TariffError::data_unavailable(path, format!("row {}: {e}", row + 1)))
    })
    .collect()
}

/// Lazily loaded, process-wide record table
pub struct RecordStore {
  path: PathBuf,
  records: OnceCell<Arc<Vec<Record>>>,
}

impl RecordStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), records: OnceCell::new() }
  }

  /// A store that is already populated (no file backing)
  pub fn from_records(records: Vec<Record>) -> Self {
    Self { path: PathBuf::from("<memory>"), records: OnceCell::with_value(Arc::new(records)) }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// All records; reads the backing file once, concurrent first callers wait on the same load
  pub fn load(&self) -> Result<Arc<Vec<Record>>> {
    self
      .records
      .get_or_try_init(|| {
        let records = load_csv(&self.path)?;
        crate::info!(&format!("Loaded {} tariff records from {}", records.len(), self.path.display()));
        Ok(Arc::new(records))
      })
      .cloned()
  }

  /// [`load`](Self::load) for async callers; a first read runs on the blocking pool
  pub async fn load_async(self: &Arc<Self>) -> Result<Arc<Vec<Record>>> {
    if let Some(records) = self.records.get() {
      return Ok(records.clone());
    }

    let store = Arc::clone(self);
    tokio::task::spawn_blocking(move || store.load())
      .await
      .map_err(|e| TariffError::data_unavailable(self.path.clone(), format!("load task failed: {e}")))?
  }

  /// Records matching a predicate, in table order
  pub fn filter<F>(&self, predicate: F) -> Result<Vec<Record>>
  where
    F: Fn(&Record) -> bool,
  {
    Ok(self.load()?.iter().filter(|record| predicate(record)).cloned().collect())
  }

  pub fn by_hts_code(&self, code: &str) -> Result<Vec<Record>> {
    self.filter(|record| filters::hts_equals(record, code))
  }

  pub fn search(&self, query: &ProductQuery) -> Result<Vec<Record>> {
    self.filter(|record| query.matches(record))
  }
}
