//! Structured error types for the skill gap engine.
//!
//! Data-quality problems never surface here; they degrade to defaults inside the
//! pipeline. Only structural failures around the engine are errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("config: {field}: {reason}")]
  Config { field: String, reason: String },

  #[error("worker pool: {0}")]
  WorkerPool(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl EngineError {
  pub fn config(field: &str, reason: &str) -> Self {
    Self::Config {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn worker_pool(msg: impl Into<String>) -> Self {
    Self::WorkerPool(msg.into())
  }
}
