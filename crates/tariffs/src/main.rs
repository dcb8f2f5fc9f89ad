use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tariffs::cli::commands;
use tariffs::server::types::{
  CalculateParams, MaterialParams, ProductSearchParams, ScenarioParams, SemanticQueryParams,
  SemanticScenarioParams,
};

#[derive(Parser)]
#[command(name = "tariffs")]
#[command(
  about = "Tariffs - landed cost lookups and what-if scenarios\nTalks to a running tariffs_server (TARIFFS_SERVER_URL)"
)]
#[command(version)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

/// Follow-up question for the AI advisor
#[derive(Args)]
struct Advice {
  /// Ask the advisor about the results (needs OPENAI_API_KEY)
  #[arg(long, value_name = "QUESTION")]
  ask: Option<String>,
}

/// Sorting of the scenario table
#[derive(Args)]
struct Sorting {
  /// Column to sort by
  #[arg(long, default_value = "Landed_Cost_USD")]
  sort_by: String,
  /// asc or desc
  #[arg(long, default_value = "asc")]
  direction: String,
}

#[derive(Subcommand)]
enum Command {
  /// Semantic product search over the whole table
  Search {
    /// Free-text product description
    query: String,
    /// Number of matches to return
    #[arg(short = 'n', long, default_value = "3")]
    top_n: i64,
    #[command(flatten)]
    advice: Advice,
  },
  /// Compare the current sourcing with an alternative material or country
  Simulate {
    /// Product name (case-insensitive substring)
    product: String,
    /// Alternative primary material
    #[arg(long)]
    material: Option<String>,
    /// Alternative country of origin
    #[arg(long)]
    country: Option<String>,
    #[command(flatten)]
    sorting: Sorting,
    #[command(flatten)]
    advice: Advice,
  },
  /// Suggest material compositions with the highest savings
  Materials {
    /// Product name (case-insensitive substring)
    product: String,
    /// Restrict to one HTS code
    #[arg(long)]
    hts: Option<String>,
    #[command(flatten)]
    advice: Advice,
  },
  /// Scenarios for the products closest to a free-text description
  WhatIf {
    /// Free-text product description
    query: String,
    /// Number of products to resolve
    #[arg(short = 'n', long, default_value = "1")]
    top_n: i64,
    #[command(flatten)]
    sorting: Sorting,
    #[command(flatten)]
    advice: Advice,
  },
  /// Tariff rate and landed cost for the closest products
  Lookup {
    /// Free-text product description
    query: String,
    /// Number of matches to return
    #[arg(short = 'n', long, default_value = "3")]
    top_n: i64,
    #[command(flatten)]
    advice: Advice,
  },
  /// Records with an exact HTS code
  Hts {
    /// HTS code, leading zeros included
    code: String,
  },
  /// Filter records by product, company and origin
  Products {
    /// Product description contains
    #[arg(long, default_value = "")]
    product: String,
    /// Company contains
    #[arg(long, default_value = "")]
    company: String,
    /// Country of origin contains
    #[arg(long, default_value = "")]
    country: String,
  },
  /// Landed cost for a shipment
  Calc {
    /// Unit material cost in USD
    #[arg(long)]
    unit_cost: f64,
    /// Number of units
    #[arg(long)]
    quantity: i64,
    /// Tariff rate in percent
    #[arg(long)]
    tariff: f64,
    /// Merchandise processing fee in USD
    #[arg(long, default_value = "0")]
    mpf: f64,
    /// Other fees in USD
    #[arg(long, default_value = "0")]
    other_fees: f64,
    #[command(flatten)]
    advice: Advice,
  },
  /// Query server logs for debugging and monitoring
  Logs {
    /// Maximum number of log entries to return
    #[arg(short, long, default_value = "50")]
    limit: usize,
    /// Filter by log level (verbose, info, success, warn, error, all)
    #[arg(long, default_value = "all")]
    level: String,
  },
  /// Check that the server is up
  Health,
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::Search { query, top_n, advice } => {
      commands::smart_search(SemanticQueryParams { query, top_n }, advice.ask.as_deref()).await
    }
    Command::Simulate { product, material, country, sorting, advice } => {
      let params = ScenarioParams {
        product_name: product,
        alt_material: material,
        alt_country: country,
        sort_by: sorting.sort_by,
        direction: sorting.direction,
      };
      commands::simulate(params, advice.ask.as_deref()).await
    }
    Command::Materials { product, hts, advice } => {
      let params = MaterialParams { product_name: product, hts_code: hts };
      commands::materials(params, advice.ask.as_deref()).await
    }
    Command::WhatIf { query, top_n, sorting, advice } => {
      let params = SemanticScenarioParams {
        query,
        top_n,
        sort_by: sorting.sort_by,
        direction: sorting.direction,
      };
      commands::what_if(params, advice.ask.as_deref()).await
    }
    Command::Lookup { query, top_n, advice } => {
      commands::tariff_lookup(SemanticQueryParams { query, top_n }, advice.ask.as_deref()).await
    }
    Command::Hts { code } => commands::hts(&code).await,
    Command::Products { product, company, country } => {
      let params =
        ProductSearchParams { product_name: product, company_name: company, country_of_origin: country };
      commands::products(params).await
    }
    Command::Calc { unit_cost, quantity, tariff, mpf, other_fees, advice } => {
      let params = CalculateParams {
        material_cost_usd: unit_cost,
        quantity,
        tariff_rate_percent: tariff,
        mpf_usd: mpf,
        other_fees_usd: other_fees,
      };
      commands::calculate(params, advice.ask.as_deref()).await
    }
    Command::Logs { limit, level } => commands::logs(limit, &level).await,
    Command::Health => commands::health().await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  handle(cli.command).await?;
  Ok(())
}
