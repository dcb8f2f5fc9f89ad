//! Landed cost arithmetic
//!
//! [`compute_landed_cost`] works on a tariff fraction at full precision.
//! [`calculate_tariff`] is the request-facing form: it takes a percentage,
//! adds the individual fees, and rounds money to cents.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TariffError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandedCost {
  pub per_unit: f64,
  pub total: f64,
}

/// Per-unit and total landed cost
///
/// `per_unit = unit_cost * (1 + tariff_rate_fraction) + fee_total / quantity`
pub fn compute_landed_cost(
  unit_cost: f64,
  tariff_rate_fraction: f64,
  fee_total: f64,
  quantity: i64,
) -> Result<LandedCost> {
  if quantity == 0 {
    return Err(TariffError::InvalidQuantity);
  }

  let quantity = quantity as f64;
  let per_unit = unit_cost * (1.0 + tariff_rate_fraction) + fee_total / quantity;
  Ok(LandedCost { per_unit, total: per_unit * quantity })
}

/// Inputs to a tariff calculation, echoed back in the result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffInputs {
  pub material_cost_usd: f64,
  pub quantity: i64,
  pub tariff_rate_percent: f64,
  #[serde(default)]
  pub mpf_usd: f64,
  #[serde(default)]
  pub other_fees_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffCalculation {
  pub landed_cost_per_unit: f64,
  pub total_landed_cost: f64,
  pub details: TariffInputs,
}

pub fn calculate_tariff(inputs: TariffInputs) -> Result<TariffCalculation> {
  let cost = compute_landed_cost(
    inputs.material_cost_usd,
    inputs.tariff_rate_percent / 100.0,
    inputs.mpf_usd + inputs.other_fees_usd,
    inputs.quantity,
  )?;

  Ok(TariffCalculation {
    landed_cost_per_unit: round_cents(cost.per_unit),
    total_landed_cost: round_cents(cost.total),
    details: inputs,
  })
}

pub fn round_cents(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}
