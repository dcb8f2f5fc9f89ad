//! Request parameters and response bodies of the HTTP API
//!
//! Every endpoint answers 200. The body's shape says what happened: a result
//! object, a `{message}` for an empty outcome, `{error}` for a rejected input
//! or `{error, trace}` for a fault. The untagged enums below encode that, and
//! the CLI client deserializes through the same types.

use serde::{Deserialize, Serialize};

use crate::calculator::{TariffCalculation, TariffInputs};
use crate::logging::journal::JournalEntry;
use crate::materials::MaterialSuggestion;
use crate::records::{ProductQuery, Record};
use crate::scenarios::{Scenario, DEFAULT_SORT_FIELD};

/// Rows returned by the lookup and search endpoints
pub const RECORD_PAGE_LIMIT: usize = 5;

pub const NO_DATA_MESSAGE: &str = "No data found for this product.";
pub const NO_SUGGESTIONS_MESSAGE: &str = "No material optimization suggestions available for this product.";
pub const NO_SEMANTIC_MATCH_MESSAGE: &str = "No product matches found for your query.";
pub const NO_PRODUCTS_MESSAGE: &str = "No matching products found.";
pub const HTS_NOT_FOUND: &str = "HTS code not found";

// Bodies shared across endpoints
// ==============================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
  pub message: String,
}

impl MessageBody {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into() }
  }

  pub fn internal(error: impl std::fmt::Display) -> Self {
    Self::new(format!("Internal server error: {error}"))
  }
}

/// A rejected input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
  pub error: String,
}

/// A fault with its cause chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultBody {
  pub error: String,
  pub trace: String,
}

impl FaultBody {
  pub fn from_error(error: impl Into<anyhow::Error>) -> Self {
    let error = error.into();
    Self { error: error.to_string(), trace: format!("{error:?}") }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
  pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsPage {
  pub count: usize,
  pub results: Vec<Record>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl RecordsPage {
  /// Total count, first page of rows
  pub fn first_page(mut records: Vec<Record>) -> Self {
    let count = records.len();
    records.truncate(RECORD_PAGE_LIMIT);
    Self { count, results: records, message: None }
  }
}

// /calculate-tariff
// =================

pub type CalculateParams = TariffInputs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalculateResponse {
  Calculated(TariffCalculation),
  Rejected(ErrorBody),
}

// /hts-lookup
// ===========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtsLookupParams {
  pub hts_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HtsLookupResponse {
  Found(RecordsPage),
  Fault(FaultBody),
  NotFound(ErrorBody),
}

// /product-search
// ===============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSearchParams {
  #[serde(default)]
  pub product_name: String,
  #[serde(default)]
  pub company_name: String,
  #[serde(default)]
  pub country_of_origin: String,
}

impl From<ProductSearchParams> for ProductQuery {
  fn from(params: ProductSearchParams) -> Self {
    ProductQuery {
      product_name: params.product_name,
      company_name: params.company_name,
      country_of_origin: params.country_of_origin,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductSearchResponse {
  Page(RecordsPage),
  Fault(FaultBody),
}

// /material-optimization
// ======================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialParams {
  pub product_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hts_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialResponse {
  Suggestions { suggestions: Vec<MaterialSuggestion> },
  Message(MessageBody),
}

// /scenario-simulation and /semantic-scenario-simulation
// ======================================================

fn default_sort_by() -> String {
  DEFAULT_SORT_FIELD.to_string()
}

fn default_direction() -> String {
  "asc".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioParams {
  pub product_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alt_material: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alt_country: Option<String>,
  #[serde(default = "default_sort_by")]
  pub sort_by: String,
  #[serde(default = "default_direction")]
  pub direction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticScenarioParams {
  pub query: String,
  #[serde(default = "default_scenario_top_n")]
  pub top_n: i64,
  #[serde(default = "default_sort_by")]
  pub sort_by: String,
  #[serde(default = "default_direction")]
  pub direction: String,
}

fn default_scenario_top_n() -> i64 {
  1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioResponse {
  Scenarios { scenarios: Vec<Scenario> },
  Fault(FaultBody),
  Message(MessageBody),
}

// /smart-product-search and /semantic-tariff-lookup
// =================================================

fn default_search_top_n() -> i64 {
  3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticQueryParams {
  pub query: String,
  #[serde(default = "default_search_top_n")]
  pub top_n: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SmartSearchResponse {
  Results { results: Vec<Record> },
  Fault(FaultBody),
}

/// Tariff-relevant projection of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffMatch {
  #[serde(rename = "Product_Description")]
  pub product_description: String,
  #[serde(rename = "HTS_Code")]
  pub hts_code: String,
  #[serde(rename = "Tariff_Rate_Percent")]
  pub tariff_rate_percent: Option<f64>,
  #[serde(rename = "Country_of_Origin")]
  pub country_of_origin: String,
  #[serde(rename = "Landed_Cost_USD")]
  pub landed_cost_usd: Option<f64>,
}

impl From<Record> for TariffMatch {
  fn from(record: Record) -> Self {
    Self {
      product_description: record.product_description,
      hts_code: record.hts_code,
      tariff_rate_percent: record.tariff_rate_percent,
      country_of_origin: record.country_of_origin,
      landed_cost_usd: record.landed_cost_usd,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SemanticLookupResponse {
  Matches { matches: Vec<TariffMatch> },
  Fault(FaultBody),
}

// /logs
// =====

fn default_logs_limit() -> usize {
  50
}

fn default_logs_level() -> String {
  "all".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsParams {
  #[serde(default = "default_logs_limit")]
  pub limit: usize,
  #[serde(default = "default_logs_level")]
  pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogsResponse {
  Logs { logs: Vec<JournalEntry> },
  Fault(FaultBody),
}
