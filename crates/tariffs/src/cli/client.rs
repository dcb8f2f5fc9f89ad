//! HTTP client for the tariffs REST API
//!
//! A thin wrapper so the CLI can talk to a local or remote server. Every
//! endpoint answers 200, so a non-success status means something other than
//! the tariffs server is listening.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::server::types::{
  CalculateParams, CalculateResponse, HealthResponse, HtsLookupParams, HtsLookupResponse, LogsParams,
  LogsResponse, MaterialParams, MaterialResponse, ProductSearchParams, ProductSearchResponse,
  ScenarioParams, ScenarioResponse, SemanticLookupResponse, SemanticQueryParams,
  SemanticScenarioParams, SmartSearchResponse,
};

pub const SERVER_URL_ENV: &str = "TARIFFS_SERVER_URL";
pub const TIMEOUT_ENV: &str = "TARIFFS_TIMEOUT_SECS";

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL of the tariffs server (e.g., "http://127.0.0.1:8000")
  pub base_url: String,
  /// Request timeout in seconds
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_SERVER_URL.to_string(), timeout_secs: DEFAULT_TIMEOUT_SECS }
  }
}

impl ClientConfig {
  /// Defaults overridden by TARIFFS_SERVER_URL and TARIFFS_TIMEOUT_SECS
  pub fn from_env() -> Self {
    let base_url = std::env::var(SERVER_URL_ENV).unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
    let timeout_secs = std::env::var(TIMEOUT_ENV)
      .ok()
      .and_then(|value| value.parse().ok())
      .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Self { base_url: base_url.trim_end_matches('/').to_string(), timeout_secs }
  }
}

pub struct TariffsClient {
  client: Client,
  config: ClientConfig,
}

impl TariffsClient {
  pub fn with_config(config: ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .context("Failed to create HTTP client")?;

    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  async fn get<P, R>(&self, path: &str, params: &P) -> Result<R>
  where
    P: Serialize + ?Sized,
    R: DeserializeOwned,
  {
    let url = format!("{}{path}", self.config.base_url);
    let response = self
      .client
      .get(&url)
      .query(params)
      .send()
      .await
      .with_context(|| format!("Could not reach tariffs server at {}", self.config.base_url))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow!("GET {path} failed: HTTP {status}: {body}"));
    }

    response.json().await.with_context(|| format!("Unexpected response from {path}"))
  }

  pub async fn health(&self) -> Result<HealthResponse> {
    let no_params: [(&str, &str); 0] = [];
    self.get("/health", &no_params).await
  }

  pub async fn calculate_tariff(&self, params: &CalculateParams) -> Result<CalculateResponse> {
    self.get("/calculate-tariff", params).await
  }

  pub async fn hts_lookup(&self, hts_code: &str) -> Result<HtsLookupResponse> {
    self.get("/hts-lookup", &HtsLookupParams { hts_code: hts_code.to_string() }).await
  }

  pub async fn product_search(&self, params: &ProductSearchParams) -> Result<ProductSearchResponse> {
    self.get("/product-search", params).await
  }

  pub async fn material_optimization(&self, params: &MaterialParams) -> Result<MaterialResponse> {
    self.get("/material-optimization", params).await
  }

  pub async fn scenario_simulation(&self, params: &ScenarioParams) -> Result<ScenarioResponse> {
    self.get("/scenario-simulation", params).await
  }

  pub async fn smart_product_search(&self, params: &SemanticQueryParams) -> Result<SmartSearchResponse> {
    self.get("/smart-product-search", params).await
  }

  pub async fn semantic_scenario_simulation(
    &self,
    params: &SemanticScenarioParams,
  ) -> Result<ScenarioResponse> {
    self.get("/semantic-scenario-simulation", params).await
  }

  pub async fn semantic_tariff_lookup(
    &self,
    params: &SemanticQueryParams,
  ) -> Result<SemanticLookupResponse> {
    self.get("/semantic-tariff-lookup", params).await
  }

  pub async fn logs(&self, params: &LogsParams) -> Result<LogsResponse> {
    self.get("/logs", params).await
  }
}

/// Client configured from the environment
pub fn get_client() -> Result<TariffsClient> {
  TariffsClient::with_config(ClientConfig::from_env())
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::{Matcher, Server};
  use serial_test::serial;

  fn client_for(server: &Server) -> TariffsClient {
    TariffsClient::with_config(ClientConfig { base_url: server.url(), timeout_secs: 5 }).unwrap()
  }

  #[test]
  #[serial]
  fn test_config_from_env() {
    std::env::set_var(SERVER_URL_ENV, "http://tariffs.internal:9000/");
    std::env::set_var(TIMEOUT_ENV, "not-a-number");
    let config = ClientConfig::from_env();
    std::env::remove_var(SERVER_URL_ENV);
    std::env::remove_var(TIMEOUT_ENV);

    assert_eq!(config.base_url, "http://tariffs.internal:9000");
    assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
  }

  #[tokio::test]
  async fn test_query_parameters_are_sent() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/material-optimization")
      .match_query(Matcher::UrlEncoded("product_name".into(), "cotton gloves".into()))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"message":"No data found for this product."}"#)
      .create_async()
      .await;

    let params = MaterialParams { product_name: "cotton gloves".to_string(), hts_code: None };
    let response = client_for(&server).material_optimization(&params).await.unwrap();

    assert!(matches!(response, MaterialResponse::Message(ref m) if m.message.starts_with("No data")));
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_non_success_status_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", "/health").with_status(502).with_body("bad gateway").create_async().await;

    let err = client_for(&server).health().await.unwrap_err();
    assert!(err.to_string().contains("502"));
  }
}
