//! Terminal rendering for CLI results
//!
//! Tables are rendered as plain text so the same rows can be handed to the
//! advisor as context; colour is applied only when printing.

use colored::*;

use crate::calculator::TariffCalculation;
use crate::materials::MaterialSuggestion;
use crate::records::Record;
use crate::scenarios::Scenario;
use crate::server::types::TariffMatch;

/// Rows handed to the advisor
pub const CONTEXT_ROWS: usize = 3;

pub fn money(value: Option<f64>) -> String {
  value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn percent(value: Option<f64>) -> String {
  value.map(|v| format!("{v}%")).unwrap_or_else(|| "-".to_string())
}

/// Left-aligned, space-padded columns
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
  let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
  for row in rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let format_row = |cells: Vec<&str>| {
    cells
      .iter()
      .zip(&widths)
      .map(|(cell, &width)| format!("{cell:<width$}"))
      .collect::<Vec<_>>()
      .join("  ")
      .trim_end()
      .to_string()
  };

  let mut lines = vec![format_row(headers.to_vec())];
  lines.extend(rows.iter().map(|row| format_row(row.iter().map(String::as_str).collect())));
  lines.join("\n")
}

pub fn record_rows(records: &[Record]) -> Vec<Vec<String>> {
  records
    .iter()
    .map(|r| {
      vec![
        r.product_description.clone(),
        r.hts_code.clone(),
        r.country_of_origin.clone(),
        r.alternative_country.clone(),
        r.primary_material.clone(),
        percent(r.tariff_rate_percent),
        money(r.landed_cost_usd),
        money(r.potential_savings_usd),
        r.company.clone(),
      ]
    })
    .collect()
}

pub const RECORD_HEADERS: [&str; 9] =
  ["Product", "HTS", "Origin", "Alt. Country", "Material", "Tariff", "Landed", "Savings", "Company"];

pub fn scenario_rows(scenarios: &[Scenario]) -> Vec<Vec<String>> {
  scenarios
    .iter()
    .map(|s| {
      vec![
        s.scenario.clone(),
        s.product_description.clone(),
        s.hts_code.clone(),
        s.country_of_origin.clone(),
        s.primary_material.clone(),
        money(s.material_cost_usd),
        percent(s.tariff_rate_percent),
        money(s.landed_cost_usd),
      ]
    })
    .collect()
}

pub const SCENARIO_HEADERS: [&str; 8] =
  ["Scenario", "Product", "HTS", "Origin", "Material", "Unit Cost", "Tariff", "Landed"];

pub fn match_rows(matches: &[TariffMatch]) -> Vec<Vec<String>> {
  matches
    .iter()
    .map(|m| {
      vec![
        m.product_description.clone(),
        m.hts_code.clone(),
        percent(m.tariff_rate_percent),
        m.country_of_origin.clone(),
        money(m.landed_cost_usd),
      ]
    })
    .collect()
}

pub const MATCH_HEADERS: [&str; 5] = ["Product", "HTS", "Tariff", "Origin", "Landed"];

pub fn render_suggestions(suggestions: &[MaterialSuggestion]) -> String {
  suggestions
    .iter()
    .enumerate()
    .map(|(i, s)| {
      format!(
        "{}. {} (primary: {}, potential savings: {})",
        i + 1,
        s.materials,
        s.primary_material,
        money(s.potential_savings_usd)
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn render_calculation(calculation: &TariffCalculation) -> String {
  let d = &calculation.details;
  format!(
    "Landed cost per unit: {:.2}\nTotal landed cost:    {:.2}\n\n\
     Unit cost {:.2} x {} units at {}% tariff, MPF {:.2}, other fees {:.2}",
    calculation.landed_cost_per_unit,
    calculation.total_landed_cost,
    d.material_cost_usd,
    d.quantity,
    d.tariff_rate_percent,
    d.mpf_usd,
    d.other_fees_usd
  )
}

/// Print a rendered table with a highlighted header line
pub fn print_table(table: &str) {
  let mut lines = table.lines();
  if let Some(header) = lines.next() {
    println!("{}", header.bold());
  }
  for line in lines {
    println!("{line}");
  }
  println!();
}

pub fn print_message(message: &str) {
  println!("{} {}", "ℹ".blue(), message);
}

pub fn print_error(message: &str) {
  println!("{} {}", "✗".red(), message.red());
}

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.len() + 1 + word.len() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(std::mem::take(&mut current_line));
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

pub fn print_advice(reply: &str) {
  println!("{}", "AI:".yellow().bold());
  for line in wrap_text(reply, 80) {
    println!("  {line}");
  }
}
