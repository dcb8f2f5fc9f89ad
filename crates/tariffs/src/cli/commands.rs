use anyhow::{anyhow, Result};
use colored::*;

use crate::advisor::{AdvisorProvider, OpenAiAdvisor};
use crate::cli::client::get_client;
use crate::cli::display::{self, CONTEXT_ROWS};
use crate::config::Settings;
use crate::server::types::{
  CalculateParams, CalculateResponse, FaultBody, HtsLookupResponse, LogsParams, LogsResponse,
  MaterialParams, MaterialResponse, ProductSearchParams, ProductSearchResponse, ScenarioParams,
  ScenarioResponse, SemanticLookupResponse, SemanticQueryParams, SemanticScenarioParams,
  SmartSearchResponse, NO_PRODUCTS_MESSAGE,
};
// Thin client: every command goes through the HTTP API

fn fault(body: FaultBody) -> anyhow::Error {
  anyhow!("{}", body.error)
}

/// First rows of a table, rendered the way they are printed
fn table_context(headers: &[&str], rows: &[Vec<String>]) -> String {
  display::render_table(headers, &rows[..rows.len().min(CONTEXT_ROWS)])
}

/// The advisor's reply, or the reason it could not give one
pub async fn ask_advisor(
  advisor: &dyn AdvisorProvider,
  feature: &str,
  context: &str,
  question: &str,
) -> String {
  match advisor.ask(feature, context, question).await {
    Ok(reply) => reply,
    Err(e) => format!("AI chat error: {e}"),
  }
}

async fn advise(feature: &str, context: &str, question: Option<&str>) -> Result<()> {
  let Some(question) = question.filter(|q| !q.trim().is_empty()) else {
    return Ok(());
  };

  let settings = Settings::load(None)?;
  let reply = match OpenAiAdvisor::new(settings.advisor, settings.api_key) {
    Ok(advisor) => ask_advisor(&advisor, feature, context, question).await,
    Err(e) => format!("AI chat error: {e}"),
  };

  display::print_advice(&reply);
  Ok(())
}

/// Smart Search tab
pub async fn smart_search(params: SemanticQueryParams, ask: Option<&str>) -> Result<()> {
  let client = get_client()?;

  match client.smart_product_search(&params).await? {
    SmartSearchResponse::Results { results } if results.is_empty() => {
      display::print_message("No products found. Try broader keywords or change filters.");
      Ok(())
    }
    SmartSearchResponse::Results { results } => {
      let rows = display::record_rows(&results);
      display::print_table(&display::render_table(&display::RECORD_HEADERS, &rows));
      advise("Smart Product Search", &table_context(&display::RECORD_HEADERS, &rows), ask).await
    }
    SmartSearchResponse::Fault(body) => Err(fault(body)),
  }
}

async fn show_scenarios(response: ScenarioResponse, feature: &str, ask: Option<&str>) -> Result<()> {
  match response {
    ScenarioResponse::Scenarios { scenarios } if scenarios.is_empty() => {
      display::print_message("No scenarios generated. Try different inputs or fewer alternatives.");
      Ok(())
    }
    ScenarioResponse::Scenarios { scenarios } => {
      let rows = display::scenario_rows(&scenarios);
      display::print_table(&display::render_table(&display::SCENARIO_HEADERS, &rows));
      advise(feature, &table_context(&display::SCENARIO_HEADERS, &rows), ask).await
    }
    ScenarioResponse::Message(body) => {
      display::print_message(&body.message);
      Ok(())
    }
    ScenarioResponse::Fault(body) => Err(fault(body)),
  }
}

/// Scenario Sim. tab
pub async fn simulate(params: ScenarioParams, ask: Option<&str>) -> Result<()> {
  let client = get_client()?;
  let response = client.scenario_simulation(&params).await?;
  show_scenarios(response, "Scenario Simulation", ask).await
}

/// Semantic What-if tab
pub async fn what_if(params: SemanticScenarioParams, ask: Option<&str>) -> Result<()> {
  let client = get_client()?;
  let response = client.semantic_scenario_simulation(&params).await?;
  show_scenarios(response, "Semantic What-If Scenario", ask).await
}

/// Material Opt. tab
pub async fn materials(params: MaterialParams, ask: Option<&str>) -> Result<()> {
  let client = get_client()?;

  match client.material_optimization(&params).await? {
    MaterialResponse::Suggestions { suggestions } => {
      println!("{}", display::render_suggestions(&suggestions));
      println!();
      let context = serde_json::to_string_pretty(&suggestions)?;
      advise("Material Optimization", &context, ask).await
    }
    MaterialResponse::Message(body) => {
      display::print_message(&body.message);
      Ok(())
    }
  }
}

/// Tariff Lookup tab
pub async fn tariff_lookup(params: SemanticQueryParams, ask: Option<&str>) -> Result<()> {
  let client = get_client()?;

  match client.semantic_tariff_lookup(&params).await? {
    SemanticLookupResponse::Matches { matches } if matches.is_empty() => {
      display::print_message("No tariff info found. Try simplifying the product description.");
      Ok(())
    }
    SemanticLookupResponse::Matches { matches } => {
      let rows = display::match_rows(&matches);
      display::print_table(&display::render_table(&display::MATCH_HEADERS, &rows));
      advise("Tariff Lookup", &table_context(&display::MATCH_HEADERS, &rows), ask).await
    }
    SemanticLookupResponse::Fault(body) => Err(fault(body)),
  }
}

/// Tariff Calc. tab
pub async fn calculate(params: CalculateParams, ask: Option<&str>) -> Result<()> {
  let client = get_client()?;

  match client.calculate_tariff(&params).await? {
    CalculateResponse::Calculated(calculation) => {
      println!("{}", display::render_calculation(&calculation));
      println!();
      let context = serde_json::to_string_pretty(&calculation)?;
      advise("Landed Cost Calculation", &context, ask).await
    }
    CalculateResponse::Rejected(body) => {
      display::print_error(&body.error);
      Ok(())
    }
  }
}

/// Exact HTS code lookup
pub async fn hts(code: &str) -> Result<()> {
  let client = get_client()?;

  match client.hts_lookup(code).await? {
    HtsLookupResponse::Found(page) => {
      println!("{} {} record(s) for HTS {}", "✓".green(), page.count, code.cyan());
      display::print_table(&display::render_table(
        &display::RECORD_HEADERS,
        &display::record_rows(&page.results),
      ));
      Ok(())
    }
    HtsLookupResponse::NotFound(body) => {
      display::print_error(&body.error);
      Ok(())
    }
    HtsLookupResponse::Fault(body) => Err(fault(body)),
  }
}

/// Substring product search
pub async fn products(params: ProductSearchParams) -> Result<()> {
  let client = get_client()?;

  match client.product_search(&params).await? {
    ProductSearchResponse::Page(page) if page.count == 0 => {
      display::print_message(page.message.as_deref().unwrap_or(NO_PRODUCTS_MESSAGE));
      Ok(())
    }
    ProductSearchResponse::Page(page) => {
      println!("{} {} matching product(s)", "✓".green(), page.count);
      display::print_table(&display::render_table(
        &display::RECORD_HEADERS,
        &display::record_rows(&page.results),
      ));
      Ok(())
    }
    ProductSearchResponse::Fault(body) => Err(fault(body)),
  }
}

pub async fn health() -> Result<()> {
  let client = get_client()?;
  let response = client.health().await?;
  println!("{} {} is {}", "✓".green(), client.base_url().cyan(), response.status.green());
  Ok(())
}

/// Recent server journal entries
pub async fn logs(limit: usize, level: &str) -> Result<()> {
  let client = get_client()?;
  let params = LogsParams { limit, level: level.to_string() };

  let entries = match client.logs(&params).await? {
    LogsResponse::Logs { logs } => logs,
    LogsResponse::Fault(body) => return Err(fault(body)),
  };

  if entries.is_empty() {
    println!("No logs found.");
    return Ok(());
  }

  for entry in entries {
    let level_colored = match entry.level.as_str() {
      "error" => entry.level.red().bold(),
      "warn" => entry.level.yellow().bold(),
      "info" => entry.level.blue().bold(),
      "success" => entry.level.bright_green().bold(),
      _ => entry.level.normal(),
    };
    println!("{} [{}] {}", entry.timestamp.to_string().cyan(), level_colored, entry.message);

    if let Some(request) = &entry.request {
      if let (Some(status), Some(duration)) = (request.status_code, request.duration_ms) {
        println!("  {} status: {}, duration: {:.2}ms", "└─".white().dimmed(), status, duration);
      }
    }
  }

  Ok(())
}
