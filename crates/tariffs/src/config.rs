//! Settings for the server and the CLI
//!
//! Resolution order, lowest to highest: built-in defaults, the first settings
//! file found, environment variables, command-line flags. The API credential
//! is only ever read from the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DATA_PATH_ENV: &str = "TARIFFS_DATA";
pub const BIND_ENV: &str = "TARIFFS_BIND";

const SETTINGS_PATHS: [&str; 3] = ["tariffs.yaml", ".tariffs.yaml", ".tariffs/config.yaml"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
  /// CSV table backing the record store
  #[serde(default = "default_data_path")]
  pub data_path: PathBuf,

  /// Server bind address
  #[serde(default = "default_bind")]
  pub bind: SocketAddr,

  /// Request journal location; defaults under the home directory
  #[serde(default)]
  pub logs_path: Option<PathBuf>,

  #[serde(default)]
  pub embeddings: EmbeddingSettings,

  #[serde(default)]
  pub advisor: AdvisorSettings,

  #[serde(skip)]
  pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingBackend {
  /// OpenAI-compatible `/embeddings` endpoint
  Openai,
  /// ONNX model run in-process (requires the `local-embeddings` feature)
  Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
  #[serde(default = "default_backend")]
  pub provider: EmbeddingBackend,

  #[serde(default = "default_embedding_model")]
  pub model: String,

  #[serde(default = "default_base_url")]
  pub base_url: String,

  /// Texts per request when embedding the whole table
  #[serde(default = "default_batch_size")]
  pub batch_size: usize,

  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorSettings {
  #[serde(default = "default_chat_model")]
  pub model: String,

  #[serde(default = "default_base_url")]
  pub base_url: String,

  #[serde(default = "default_temperature")]
  pub temperature: f32,

  #[serde(default = "default_max_tokens")]
  pub max_tokens: u32,

  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_data_path() -> PathBuf {
  PathBuf::from("data").join("tariffs.csv")
}
fn default_bind() -> SocketAddr {
  SocketAddr::from(([127, 0, 0, 1], 8000))
}
fn default_backend() -> EmbeddingBackend {
  EmbeddingBackend::Openai
}
fn default_embedding_model() -> String {
  "text-embedding-3-small".to_string()
}
fn default_chat_model() -> String {
  "gpt-3.5-turbo".to_string()
}
fn default_base_url() -> String {
  "https://api.openai.com/v1".to_string()
}
fn default_batch_size() -> usize {
  100
}
fn default_timeout_secs() -> u64 {
  30
}
fn default_temperature() -> f32 {
  0.15
}
fn default_max_tokens() -> u32 {
  320
}

impl Default for EmbeddingSettings {
  fn default() -> Self {
    Self {
      provider: default_backend(),
      model: default_embedding_model(),
      base_url: default_base_url(),
      batch_size: default_batch_size(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl Default for AdvisorSettings {
  fn default() -> Self {
    Self {
      model: default_chat_model(),
      base_url: default_base_url(),
      temperature: default_temperature(),
      max_tokens: default_max_tokens(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_path: default_data_path(),
      bind: default_bind(),
      logs_path: None,
      embeddings: EmbeddingSettings::default(),
      advisor: AdvisorSettings::default(),
      api_key: None,
    }
  }
}

impl Settings {
  /// Parse a YAML settings file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_yaml::from_str(&content)
      .with_context(|| format!("Invalid settings file {}", path.display()))?;
    Ok(settings)
  }

  /// Settings from an explicit file, the first default location that exists,
  /// or built-in defaults, with environment overrides applied
  pub fn load(explicit: Option<&Path>) -> Result<Self> {
    let mut settings = match explicit {
      Some(path) => Self::load_from_file(path)?,
      None => match SETTINGS_PATHS.iter().map(Path::new).find(|p| p.exists()) {
        Some(path) => Self::load_from_file(path)?,
        None => Settings::default(),
      },
    };

    settings.apply_env()?;
    Ok(settings)
  }

  /// Apply environment overrides
  pub fn apply_env(&mut self) -> Result<()> {
    self.api_key = std::env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty());

    if let Ok(path) = std::env::var(DATA_PATH_ENV) {
      self.data_path = PathBuf::from(path);
    }

    if let Ok(bind) = std::env::var(BIND_ENV) {
      self.bind = bind.parse().with_context(|| format!("{BIND_ENV} is not a socket address"))?;
    }

    Ok(())
  }

  /// Journal location, falling back to ~/.tariffs (or /tmp when there is no home)
  pub fn resolved_logs_path(&self) -> PathBuf {
    self.logs_path.clone().unwrap_or_else(|| {
      dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".tariffs")
        .join("server.logs.jsonl")
    })
  }
}
