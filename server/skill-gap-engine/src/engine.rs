//! Core engine: normalize, summarize, roll up and report.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::batch::{self, WorkerPool};
use crate::cohort::Rollup;
use crate::config::Config;
use crate::error::EngineError;
use crate::normalize::ProfileIndex;
use crate::report;
use crate::types::*;

/// The skill gap engine. Holds configuration and a reusable worker pool;
/// every call recomputes from the supplied snapshot.
#[derive(Debug, Clone)]
pub struct Engine {
  config: Config,
  workers: WorkerPool,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    let workers = WorkerPool::new(config.worker_count());
    Self { config, workers }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Produce a report for the request's scope.
  ///
  /// Data-quality problems never fail; errors come only from invalid
  /// configuration or a worker pool that cannot start.
  pub fn analyze(
    &self,
    request: &AnalysisRequest,
    generated_at: DateTime<Utc>,
  ) -> Result<GapReport, EngineError> {
    self.config.validate()?;

    let in_scope: Vec<&EmployeeInput> = request
      .employees
      .iter()
      .filter(|e| request.scope.contains(e))
      .collect();
    debug!(
      total = request.employees.len(),
      in_scope = in_scope.len(),
      scope = %request.scope.label(),
      "analyzing skill gaps"
    );

    let profiles = ProfileIndex::build(&request.ideal_profiles);
    let (summaries, rollup) =
      batch::summarize_all(&in_scope, &profiles, &self.config, &self.workers)?;
    let rollup: Rollup = rollup.finish(&request.scope.label(), &self.config);

    Ok(report::build_report(
      request.scope.clone(),
      generated_at,
      summaries,
      rollup,
      &self.config,
    ))
  }
}
