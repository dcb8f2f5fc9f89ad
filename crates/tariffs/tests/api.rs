use async_trait::async_trait;
use axum::{
  body::{to_bytes, Body},
  http::{Request, StatusCode},
  Router,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use tower::ServiceExt; // for oneshot()

use tariffs::embeddings::EmbeddingProvider;
use tariffs::errors::{Result, TariffError};
use tariffs::logging::journal::Journal;
use tariffs::records::RecordStore;
use tariffs::server::{routing::create_router, AppState};

const TABLE: &str = "\
Product_Description,HTS_Code,Country_of_Origin,Alternative_Country,Material_Composition,Primary_Material,Material_Cost_USD,Tariff_Rate_Percent,Landed_Cost_USD,Potential_Savings_USD,Company
Cotton Work Gloves,06110000,India,Vietnam,80% cotton 20% polyester,Cotton,2.5,5.0,3.1,0.4,Acme Corp
Nitrile Exam Gloves,40151900,Malaysia,Thailand,100% nitrile,Nitrile,0.8,3.0,1.05,,Globex
Leather Shoes,64035990,Indonesia,Vietnam,,Leather,22.0,8.5,27.4,3.2,Initech
";

/// Bag-of-words vectors over a tiny vocabulary
struct KeywordEmbeddings;

fn keyword_vector(text: &str) -> Vec<f32> {
  let text = text.to_lowercase();
  ["glove", "cotton", "nitrile", "leather", "shoe"]
    .iter()
    .map(|word| text.matches(word).count() as f32)
    .collect()
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbeddings {
  async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    Ok(texts.iter().map(|text| keyword_vector(text)).collect())
  }

  async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
    Ok(keyword_vector(text))
  }
}

struct OfflineEmbeddings;

#[async_trait]
impl EmbeddingProvider for OfflineEmbeddings {
  async fn embed_documents(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
    Err(TariffError::embedding_unavailable("OPENAI_API_KEY is not set"))
  }

  async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
    Err(TariffError::embedding_unavailable("OPENAI_API_KEY is not set"))
  }
}

struct TestServer {
  app: Router,
  _data: NamedTempFile,
  _logs: TempDir,
}

fn server_with(provider: Arc<dyn EmbeddingProvider>) -> TestServer {
  let mut data = NamedTempFile::new().unwrap();
  data.write_all(TABLE.as_bytes()).unwrap();

  let logs = TempDir::new().unwrap();
  let journal = Journal::open_with_silent(logs.path().join("server.logs.jsonl"), true).unwrap();

  let store = Arc::new(RecordStore::new(data.path()));
  let app = create_router(Arc::new(AppState::new(store, provider, journal)));
  TestServer { app, _data: data, _logs: logs }
}

fn server() -> TestServer {
  server_with(Arc::new(KeywordEmbeddings))
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
  let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, body)
}

fn landed(scenario: &Value) -> f64 {
  scenario["Landed_Cost_USD"].as_f64().unwrap()
}

#[tokio::test]
async fn test_health() {
  let server = server();
  let (status, body) = get_json(&server.app, "/health").await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_calculate_tariff() {
  let server = server();
  let (status, body) = get_json(
    &server.app,
    "/calculate-tariff?material_cost_usd=10&quantity=100&tariff_rate_percent=5&other_fees_usd=25",
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["landed_cost_per_unit"], json!(10.75));
  assert_eq!(body["total_landed_cost"], json!(1075.0));
  assert_eq!(body["details"]["mpf_usd"], json!(0.0));
  assert_eq!(body["details"]["quantity"], json!(100));
}

#[tokio::test]
async fn test_calculate_tariff_rejects_zero_quantity() {
  let server = server();
  let (status, body) =
    get_json(&server.app, "/calculate-tariff?material_cost_usd=10&quantity=0&tariff_rate_percent=5").await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "error": "Quantity cannot be zero." }));
}

#[tokio::test]
async fn test_hts_lookup() {
  let server = server();

  let (status, body) = get_json(&server.app, "/hts-lookup?hts_code=06110000").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["count"], json!(1));
  assert_eq!(body["results"][0]["Product_Description"], json!("Cotton Work Gloves"));

  // Exact match only, leading zeros included
  let (status, body) = get_json(&server.app, "/hts-lookup?hts_code=6110000").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "error": "HTS code not found" }));
}

#[tokio::test]
async fn test_product_search() {
  let server = server();

  let (_, body) = get_json(&server.app, "/product-search?product_name=gloves&country_of_origin=india").await;
  assert_eq!(body["count"], json!(1));
  assert_eq!(body["results"][0]["Company"], json!("Acme Corp"));

  let (status, body) = get_json(&server.app, "/product-search?product_name=unobtainium").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "count": 0, "results": [], "message": "No matching products found." }));
}

#[tokio::test]
async fn test_product_search_without_data_is_a_fault() {
  let logs = TempDir::new().unwrap();
  let journal = Journal::open_with_silent(logs.path().join("server.logs.jsonl"), true).unwrap();
  let store = Arc::new(RecordStore::new(logs.path().join("missing.csv")));
  let app = create_router(Arc::new(AppState::new(store, Arc::new(KeywordEmbeddings), journal)));

  let (status, body) = get_json(&app, "/product-search?product_name=gloves").await;

  assert_eq!(status, StatusCode::OK);
  assert!(body["error"].as_str().unwrap().starts_with("Tariff data not available"));
  assert!(body["trace"].is_string());
}

#[tokio::test]
async fn test_scenario_simulation() {
  let server = server();
  let (status, body) =
    get_json(&server.app, "/scenario-simulation?product_name=leather&alt_country=Vietnam").await;

  assert_eq!(status, StatusCode::OK);
  let scenarios = body["scenarios"].as_array().unwrap();
  assert_eq!(scenarios.len(), 2);
  assert_eq!(scenarios[0]["scenario"], json!("alt_country: Vietnam"));
  assert!((landed(&scenarios[0]) - 24.2).abs() < 1e-9);
  assert_eq!(scenarios[1]["scenario"], json!("current"));
}

#[tokio::test]
async fn test_scenario_simulation_sorts_descending() {
  let server = server();
  let (_, body) = get_json(
    &server.app,
    "/scenario-simulation?product_name=leather&alt_country=Vietnam&direction=DESC",
  )
  .await;

  let scenarios = body["scenarios"].as_array().unwrap();
  assert_eq!(scenarios[0]["scenario"], json!("current"));
  assert!(landed(&scenarios[0]) > landed(&scenarios[1]));
}

#[tokio::test]
async fn test_unknown_product_messages() {
  let server = server();

  let (status, body) = get_json(&server.app, "/scenario-simulation?product_name=unobtainium").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "message": "No data found for this product." }));

  let (status, body) = get_json(&server.app, "/material-optimization?product_name=unobtainium").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "message": "No data found for this product." }));
}

#[tokio::test]
async fn test_material_optimization() {
  let server = server();

  let (_, body) = get_json(&server.app, "/material-optimization?product_name=gloves").await;
  let suggestions = body["suggestions"].as_array().unwrap();
  assert_eq!(suggestions.len(), 2);
  assert_eq!(suggestions[0]["materials"], json!("80% cotton 20% polyester"));

  // Matches, but no composition to suggest
  let (_, body) = get_json(&server.app, "/material-optimization?product_name=leather").await;
  assert_eq!(
    body,
    json!({ "message": "No material optimization suggestions available for this product." })
  );
}

#[tokio::test]
async fn test_smart_product_search() {
  let server = server();
  let (status, body) = get_json(&server.app, "/smart-product-search?query=leather%20boots&top_n=1").await;

  assert_eq!(status, StatusCode::OK);
  let results = body["results"].as_array().unwrap();
  assert_eq!(results.len(), 1);
  assert_eq!(results[0]["Product_Description"], json!("Leather Shoes"));
}

#[tokio::test]
async fn test_semantic_tariff_lookup_projects_tariff_fields() {
  let server = server();
  let (_, body) = get_json(&server.app, "/semantic-tariff-lookup?query=nitrile&top_n=1").await;

  assert_eq!(
    body,
    json!({ "matches": [{
      "Product_Description": "Nitrile Exam Gloves",
      "HTS_Code": "40151900",
      "Tariff_Rate_Percent": 3.0,
      "Country_of_Origin": "Malaysia",
      "Landed_Cost_USD": 1.05
    }] })
  );
}

#[tokio::test]
async fn test_semantic_scenario_simulation() {
  let server = server();
  let (status, body) = get_json(&server.app, "/semantic-scenario-simulation?query=leather%20boots").await;

  assert_eq!(status, StatusCode::OK);
  let scenarios = body["scenarios"].as_array().unwrap();
  assert_eq!(scenarios.len(), 1);
  assert_eq!(scenarios[0]["scenario"], json!("current"));
  assert_eq!(scenarios[0]["Product_Description"], json!("Leather Shoes"));
}

#[tokio::test]
async fn test_semantic_endpoints_report_embedding_faults() {
  let server = server_with(Arc::new(OfflineEmbeddings));

  for uri in [
    "/smart-product-search?query=gloves",
    "/semantic-tariff-lookup?query=gloves",
    "/semantic-scenario-simulation?query=gloves",
  ] {
    let (status, body) = get_json(&server.app, uri).await;
    assert_eq!(status, StatusCode::OK, "{uri}");
    assert!(body["error"].as_str().unwrap().starts_with("Embedding service unavailable"), "{uri}");
    assert!(body["trace"].is_string(), "{uri}");
  }

  // Non-semantic routes are unaffected
  let (_, body) = get_json(&server.app, "/hts-lookup?hts_code=64035990").await;
  assert_eq!(body["count"], json!(1));
}

#[tokio::test]
async fn test_logs_record_completed_requests() {
  let server = server();
  get_json(&server.app, "/health").await;

  let (status, body) = get_json(&server.app, "/logs?level=info").await;
  assert_eq!(status, StatusCode::OK);

  let logs = body["logs"].as_array().unwrap();
  assert!(!logs.is_empty());
  assert!(logs.iter().all(|entry| entry["level"] == json!("info")));
  assert!(logs.iter().any(|entry| entry["request"]["path"] == json!("/health")
    && entry["request"]["status_code"] == json!(200)));
}
