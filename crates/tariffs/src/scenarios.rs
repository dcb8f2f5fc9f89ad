//! What-if scenarios for a product
//!
//! Every matching record yields a `current` scenario, plus an alternate
//! material scenario and an alternate country scenario when the record allows
//! them. Scenarios are fresh copies; the records they come from are never
//! touched.
//!
//! A material swap keeps every cost field as it was. Only the country swap
//! re-costs, by subtracting the record's potential savings from its landed
//! cost, and the result may go negative.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::errors::Result;
use crate::records::{filters, Record, RecordStore};
use crate::resolver::SemanticResolver;

/// Most scenarios returned by any simulation
pub const SCENARIO_LIMIT: usize = 3;

/// Field the API sorts by unless told otherwise
///
/// The API re-sort reads a missing landed cost as 0, so an ascending request
/// puts such a scenario first even though the engine ranked it last.
pub const DEFAULT_SORT_FIELD: &str = "Landed_Cost_USD";

pub const CURRENT_LABEL: &str = "current";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
  #[serde(rename = "Product_Description")]
  pub product_description: String,

  #[serde(rename = "HTS_Code")]
  pub hts_code: String,

  #[serde(rename = "Country_of_Origin")]
  pub country_of_origin: String,

  #[serde(rename = "Material_Cost_USD")]
  pub material_cost_usd: Option<f64>,

  #[serde(rename = "Tariff_Rate_Percent")]
  pub tariff_rate_percent: Option<f64>,

  #[serde(rename = "Landed_Cost_USD")]
  pub landed_cost_usd: Option<f64>,

  #[serde(rename = "Primary_Material")]
  pub primary_material: String,

  /// `current`, `alt_material: <material>` or `alt_country: <country>`
  pub scenario: String,
}

impl Scenario {
  pub fn current(record: &Record) -> Self {
    Self {
      product_description: record.product_description.clone(),
      hts_code: record.hts_code.clone(),
      country_of_origin: record.country_of_origin.clone(),
      material_cost_usd: record.material_cost_usd,
      tariff_rate_percent: record.tariff_rate_percent,
      landed_cost_usd: record.landed_cost_usd,
      primary_material: record.primary_material.clone(),
      scenario: CURRENT_LABEL.to_string(),
    }
  }

  fn with_material(&self, material: &str) -> Self {
    Self {
      primary_material: material.to_string(),
      scenario: format!("alt_material: {material}"),
      ..self.clone()
    }
  }

  fn with_country(&self, country: &str, savings: f64) -> Self {
    Self {
      country_of_origin: country.to_string(),
      landed_cost_usd: self.landed_cost_usd.map(|landed| landed - savings),
      scenario: format!("alt_country: {country}"),
      ..self.clone()
    }
  }

  /// Value of a field by its serialized name; unknown fields and missing
  /// numbers read as zero
  pub fn sort_key(&self, field: &str) -> SortKey {
    let text = |value: &str| SortKey::Text(value.to_string());
    let number = |value: Option<f64>| SortKey::Number(value.unwrap_or(0.0));

    match field {
      "Product_Description" => text(&self.product_description),
      "HTS_Code" => text(&self.hts_code),
      "Country_of_Origin" => text(&self.country_of_origin),
      "Primary_Material" => text(&self.primary_material),
      "scenario" => text(&self.scenario),
      "Material_Cost_USD" => number(self.material_cost_usd),
      "Tariff_Rate_Percent" => number(self.tariff_rate_percent),
      "Landed_Cost_USD" => number(self.landed_cost_usd),
      _ => SortKey::Number(0.0),
    }
  }

  fn engine_order(&self, other: &Self) -> Ordering {
    let landed = |s: &Self| s.landed_cost_usd.unwrap_or(f64::INFINITY);
    landed(self).total_cmp(&landed(other))
  }
}

/// Orderable field value; numbers sort before text
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
  Number(f64),
  Text(String),
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for SortKey {
  fn cmp(&self, other: &Self) -> Ordering {
    match (self, other) {
      (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
      (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
      (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
      (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

impl From<&str> for SortDirection {
  /// `desc` in any case is descending, anything else ascending
  fn from(value: &str) -> Self {
    if value.eq_ignore_ascii_case("desc") {
      SortDirection::Desc
    } else {
      SortDirection::Asc
    }
  }
}

/// Stable re-sort on any scenario field, then cap at [`SCENARIO_LIMIT`]
pub fn sort_and_truncate(
  mut scenarios: Vec<Scenario>,
  sort_by: &str,
  direction: SortDirection,
) -> Vec<Scenario> {
  scenarios.sort_by(|a, b| {
    let ordering = a.sort_key(sort_by).cmp(&b.sort_key(sort_by));
    match direction {
      SortDirection::Asc => ordering,
      SortDirection::Desc => ordering.reverse(),
    }
  });
  scenarios.truncate(SCENARIO_LIMIT);
  scenarios
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationOutcome {
  Scenarios(Vec<Scenario>),
  /// No record matched the product name
  NoData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SemanticSimulation {
  /// Scenarios of every resolved product, merged but not yet re-sorted
  Scenarios(Vec<Scenario>),
  NoMatches,
}

pub struct ScenarioEngine {
  store: Arc<RecordStore>,
}

impl ScenarioEngine {
  pub fn new(store: Arc<RecordStore>) -> Self {
    Self { store }
  }

  /// Scenarios for every record whose description contains `product_name`,
  /// cheapest landed cost first (unknown cost last), at most three
  ///
  /// Empty alternates are ignored.
  pub fn simulate(
    &self,
    product_name: &str,
    alt_material: Option<&str>,
    alt_country: Option<&str>,
  ) -> Result<SimulationOutcome> {
    let alt_material = alt_material.filter(|value| !value.is_empty());
    let alt_country = alt_country.filter(|value| !value.is_empty());

    let matches = self.store.filter(|record| filters::description_contains(record, product_name))?;
    if matches.is_empty() {
      return Ok(SimulationOutcome::NoData);
    }

    let mut scenarios = Vec::new();
    for record in &matches {
      let current = Scenario::current(record);
      let material = alt_material
        .filter(|m| material_applies(record, m))
        .map(|m| current.with_material(m));
      let country = alt_country
        .filter(|c| c.to_lowercase() == record.alternative_country.to_lowercase())
        .map(|c| current.with_country(c, record.savings_or_zero()));

      scenarios.push(current);
      scenarios.extend(material);
      scenarios.extend(country);
    }

    // Stable, so a record's scenarios keep current/material/country order on ties
    scenarios.sort_by(|a, b| a.engine_order(b));
    scenarios.truncate(SCENARIO_LIMIT);

    crate::verbose!(&format!(
      "Simulated {} scenario(s) from {} record(s) for '{product_name}'",
      scenarios.len(),
      matches.len()
    ));
    Ok(SimulationOutcome::Scenarios(scenarios))
  }

  /// Resolve `query` to products and simulate each one by its full
  /// description, with no alternates
  pub async fn simulate_semantic(
    &self,
    resolver: &SemanticResolver,
    query: &str,
    top_n: i64,
  ) -> Result<SemanticSimulation> {
    let matches = resolver.resolve(query, top_n).await?;
    if matches.is_empty() {
      return Ok(SemanticSimulation::NoMatches);
    }

    let mut merged = Vec::new();
    for record in &matches {
      if let SimulationOutcome::Scenarios(scenarios) =
        self.simulate(&record.product_description, None, None)?
      {
        merged.extend(scenarios);
      }
    }
    Ok(SemanticSimulation::Scenarios(merged))
  }
}

fn material_applies(record: &Record, material: &str) -> bool {
  let material = material.to_lowercase();
  let in_composition = record
    .material_composition
    .as_deref()
    .is_some_and(|composition| composition.to_lowercase().contains(&material));
  in_composition || record.primary_material.to_lowercase() == material
}
