//! Binary entrypoint: read one AnalysisRequest JSON from stdin, write one
//! GapReport JSON to stdout.
//!
//! On failure an ErrorOutput JSON is written to stdout and the process exits 1.
//! Logs go to stderr (filter with RUST_LOG).
//!
//! Config precedence: the request's `config` field, then the JSON file named by
//! SKILL_GAP_CONFIG, then built-in defaults.

use chrono::Utc;
use skill_gap_engine::types::ErrorOutput;
use skill_gap_engine::{AnalysisRequest, Config, Engine, EngineError};
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  if let Err(e) = run_binary() {
    tracing::error!(error = %e, "skill-gap-engine failed");
    let err = match &e {
      EngineError::Config { field, reason } => {
        ErrorOutput::new(reason.clone()).with_field(field.clone())
      }
      _ => ErrorOutput::new(e.to_string()),
    };
    let mut out = io::stdout().lock();
    let _ = serde_json::to_writer(&mut out, &err);
    let _ = writeln!(out);
    std::process::exit(1);
  }
}

fn run_binary() -> Result<(), EngineError> {
  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;
  let request: AnalysisRequest = serde_json::from_str(&raw)?;

  let config = match &request.config {
    Some(c) => c.clone(),
    None => Config::load()?,
  };
  let engine = Engine::new(config);
  let report = engine.analyze(&request, Utc::now())?;

  let mut out = io::BufWriter::new(io::stdout().lock());
  serde_json::to_writer(&mut out, &report)?;
  writeln!(out)?;
  out.flush()?;
  Ok(())
}
