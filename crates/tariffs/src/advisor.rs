//! AI advisor over rendered results
//!
//! The advisor sees the first rows of whatever the user is looking at plus
//! the user's question, and answers in prose. It is a chat-completions call
//! with a fixed framing; nothing it says feeds back into the data.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::AdvisorSettings;

pub const SYSTEM_MESSAGE: &str =
  "You are a professional assistant for supply chain, tariff, and sourcing analytics.";

/// Shorter keys are rejected without calling out
const MIN_KEY_LEN: usize = 10;

#[derive(Error, Debug)]
pub enum AdvisorError {
  #[error("OpenAI key missing or invalid.")]
  MissingKey,

  #[error("{0}")]
  Request(String),

  #[error("advisor returned no answer")]
  EmptyReply,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdvisorProvider: Send + Sync {
  /// Advice about `context` (results of `feature`) answering `question`
  async fn ask(&self, feature: &str, context: &str, question: &str) -> Result<String, AdvisorError>;
}

pub fn build_prompt(feature: &str, context: &str, question: &str) -> String {
  format!(
    "You are a professional supply chain and tariff advisor. Here are the latest results for {feature}:\n\n{context}\n\nUser question: {question}\n\nAdvice:"
  )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessage<'a>>,
  max_tokens: u32,
  temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
  #[serde(default)]
  content: Option<String>,
}

pub struct OpenAiAdvisor {
  client: Client,
  api_key: Option<String>,
  settings: AdvisorSettings,
}

impl OpenAiAdvisor {
  pub fn new(settings: AdvisorSettings, api_key: Option<String>) -> Result<Self, AdvisorError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(settings.timeout_secs))
      .build()
      .map_err(|e| AdvisorError::Request(format!("HTTP client setup failed: {e}")))?;
    Ok(Self { client, api_key, settings })
  }

  fn api_key(&self) -> Result<&str, AdvisorError> {
    self
      .api_key
      .as_deref()
      .map(str::trim)
      .filter(|key| key.len() >= MIN_KEY_LEN)
      .ok_or(AdvisorError::MissingKey)
  }
}

#[async_trait]
impl AdvisorProvider for OpenAiAdvisor {
  async fn ask(&self, feature: &str, context: &str, question: &str) -> Result<String, AdvisorError> {
    let api_key = self.api_key()?;
    let prompt = build_prompt(feature, context, question);

    let request = ChatRequest {
      model: &self.settings.model,
      messages: vec![
        ChatMessage { role: "system", content: SYSTEM_MESSAGE },
        ChatMessage { role: "user", content: &prompt },
      ],
      max_tokens: self.settings.max_tokens,
      temperature: self.settings.temperature,
    };

    let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
    let response = self
      .client
      .post(&url)
      .bearer_auth(api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| AdvisorError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(AdvisorError::Request(format!("HTTP {status}: {body}")));
    }

    let parsed: ChatResponse =
      response.json().await.map_err(|e| AdvisorError::Request(format!("invalid response: {e}")))?;

    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .map(|content| content.trim().to_string())
      .filter(|content| !content.is_empty())
      .ok_or(AdvisorError::EmptyReply)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::{Matcher, Server};

  fn advisor(server: &Server, key: Option<&str>) -> OpenAiAdvisor {
    let settings = AdvisorSettings { base_url: server.url(), ..Default::default() };
    OpenAiAdvisor::new(settings, key.map(str::to_string)).unwrap()
  }

  #[test]
  fn test_prompt_layout() {
    let prompt = build_prompt("Tariff Lookup", "row 1\nrow 2", "Is this cheap?");
    assert_eq!(
      prompt,
      "You are a professional supply chain and tariff advisor. Here are the latest results for Tariff Lookup:\n\nrow 1\nrow 2\n\nUser question: Is this cheap?\n\nAdvice:"
    );
  }

  #[tokio::test]
  async fn test_short_or_missing_key_is_rejected_without_a_call() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/chat/completions").expect(0).create_async().await;

    for key in [None, Some("sk-short"), Some("   sk-12   ")] {
      let err = advisor(&server, key).ask("Smart Search", "[]", "why?").await.unwrap_err();
      assert!(matches!(err, AdvisorError::MissingKey));
      assert_eq!(err.to_string(), "OpenAI key missing or invalid.");
    }
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_ask_sends_framed_prompt_and_returns_answer() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/chat/completions")
      .match_header("authorization", "Bearer sk-test-0123456789")
      .match_body(Matcher::PartialJson(serde_json::json!({
        "model": "gpt-3.5-turbo",
        "max_tokens": 320,
        "messages": [
          { "role": "system", "content": SYSTEM_MESSAGE },
          { "role": "user", "content": build_prompt("Tariff Calc", "{}", "Worth it?") }
        ]
      })))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"  Consider Vietnam.  "}}]}"#)
      .create_async()
      .await;

    let answer = advisor(&server, Some("sk-test-0123456789"))
      .ask("Tariff Calc", "{}", "Worth it?")
      .await
      .unwrap();

    assert_eq!(answer, "Consider Vietnam.");
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_http_failure_is_a_request_error() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/chat/completions")
      .with_status(429)
      .with_body("rate limited")
      .create_async()
      .await;

    let err = advisor(&server, Some("sk-test-0123456789")).ask("f", "c", "q").await.unwrap_err();
    assert!(matches!(err, AdvisorError::Request(ref m) if m.contains("429") && m.contains("rate limited")));
  }

  #[tokio::test]
  async fn test_empty_choices_is_empty_reply() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/chat/completions")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"choices":[]}"#)
      .create_async()
      .await;

    let err = advisor(&server, Some("sk-test-0123456789")).ask("f", "c", "q").await.unwrap_err();
    assert!(matches!(err, AdvisorError::EmptyReply));
  }
}
