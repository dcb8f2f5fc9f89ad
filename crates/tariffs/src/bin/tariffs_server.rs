//! Tariffs REST Server
//!
//! HTTP API over the tariff table: lookups, the landed cost calculator,
//! what-if scenarios and semantic product search.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use tariffs::config::Settings;
use tariffs::server::startup::start_server;

#[derive(Parser)]
#[command(name = "tariffs_server")]
#[command(about = "Tariffs REST API Server")]
#[command(version)]
struct Args {
  /// Server bind address (overrides settings and TARIFFS_BIND)
  #[arg(long)]
  bind: Option<SocketAddr>,

  /// Tariff CSV file (overrides settings and TARIFFS_DATA)
  #[arg(long)]
  data: Option<PathBuf>,

  /// YAML settings file
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let filter = if args.verbose {
    EnvFilter::new("info")
  } else {
    EnvFilter::new("tariffs=info,tower_http=warn,warn")
  };

  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  let mut settings = Settings::load(args.config.as_deref())?;
  if let Some(bind) = args.bind {
    settings.bind = bind;
  }
  if let Some(data) = args.data {
    settings.data_path = data;
  }

  tariffs::info!(&format!("Starting Tariffs REST Server v{}", env!("CARGO_PKG_VERSION")));
  tariffs::info!(&format!("Tariff data: {}", settings.data_path.display()));

  start_server(settings).await?;

  Ok(())
}
