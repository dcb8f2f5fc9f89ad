//! Persistent JSONL journal of server activity
//!
//! One JSON object per line, appended under an async lock so concurrent
//! requests never interleave partial lines. Reads tolerate malformed lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Request metadata attached to journal entries written by the middleware
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RequestMeta {
  pub request_id: String,
  pub method: String,
  pub path: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub status_code: Option<u16>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JournalEntry {
  pub timestamp: DateTime<Utc>,
  pub level: String,
  pub message: String,
  pub component: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub request: Option<RequestMeta>,
}

struct JournalInner {
  path: PathBuf,
  silent: bool,
}

/// Thread-safe, disk-backed log of what the server did
#[derive(Clone)]
pub struct Journal {
  inner: Arc<Mutex<JournalInner>>,
}

impl JournalInner {
  fn append(&mut self, entry: &JournalEntry) -> std::io::Result<()> {
    let line = serde_json::to_string(entry)
      .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    writeln!(file, "{line}")?;
    file.flush()
  }

  fn read(&self, limit: Option<usize>, level: Option<&str>) -> std::io::Result<Vec<JournalEntry>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let reader = BufReader::new(std::fs::File::open(&self.path)?);
    let mut entries = Vec::new();

    for line in reader.lines() {
      let line = line?;
      if line.trim().is_empty() {
        continue;
      }

      let Ok(entry) = serde_json::from_str::<JournalEntry>(&line) else {
        continue;
      };

      if level.map_or(true, |filter| filter == "all" || entry.level == filter) {
        entries.push(entry);
      }
    }

    // Newest N, presented oldest first
    if let Some(limit) = limit {
      let skip = entries.len().saturating_sub(limit);
      entries.drain(..skip);
    }

    Ok(entries)
  }
}

impl Journal {
  /// Open (or create) a journal at the given path, echoing entries to stderr
  pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
    Self::open_with_silent(path, false)
  }

  /// Open a journal, optionally without console echo
  pub fn open_with_silent<P: AsRef<Path>>(path: P, silent: bool) -> std::io::Result<Self> {
    let path = path.as_ref().to_path_buf();

    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
      std::fs::File::create(&path)?;
    }

    Ok(Self { inner: Arc::new(Mutex::new(JournalInner { path, silent })) })
  }

  /// Append an entry (fire-and-forget; disk errors are reported to stderr only)
  pub async fn record(
    &self,
    level: &str,
    message: &str,
    component: &str,
    request: Option<RequestMeta>,
  ) {
    let entry = JournalEntry {
      timestamp: Utc::now(),
      level: level.to_string(),
      message: message.to_string(),
      component: component.to_string(),
      request,
    };

    let mut guard = self.inner.lock().await;
    if let Err(e) = guard.append(&entry) {
      crate::warn!(&format!("Failed to write journal entry: {e}"));
    }

    if !guard.silent {
      match level {
        "warn" => {
          crate::warn!(message);
        }
        "error" => {
          crate::error!(message);
        }
        "success" => {
          crate::success!(message);
        }
        "verbose" => {
          crate::verbose!(message);
        }
        _ => {
          crate::info!(message);
        }
      }
    }
  }

  pub async fn info(&self, message: &str, component: &str) {
    self.record("info", message, component, None).await;
  }

  pub async fn warn(&self, message: &str, component: &str) {
    self.record("warn", message, component, None).await;
  }

  pub async fn error(&self, message: &str, component: &str) {
    self.record("error", message, component, None).await;
  }

  pub async fn success(&self, message: &str, component: &str) {
    self.record("success", message, component, None).await;
  }

  /// Most recent entries, optionally filtered by level ("all" disables the filter)
  pub async fn entries(
    &self,
    limit: Option<usize>,
    level: Option<&str>,
  ) -> std::io::Result<Vec<JournalEntry>> {
    let guard = self.inner.lock().await;
    guard.read(limit, level)
  }

  pub async fn path(&self) -> PathBuf {
    self.inner.lock().await.path.clone()
  }
}
