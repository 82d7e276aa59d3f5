//! Batch pipeline: summarize employees and fold them into a rollup.
//!
//! Large batches run on a rayon pool; each worker folds its share into a
//! `RollupAccumulator` and the partials are merged. Small batches use the same
//! fold sequentially. Both paths produce identical output.

use std::sync::{Arc, OnceLock};

use rayon::prelude::*;
use tracing::debug;

use crate::cohort::{Rollup, RollupAccumulator};
use crate::config::Config;
use crate::employee;
use crate::error::EngineError;
use crate::normalize::ProfileIndex;
use crate::types::{EmployeeInput, EmployeeSummary};

/// Bounded rayon pool, built on first parallel use and shared by clones.
#[derive(Debug, Clone)]
pub struct WorkerPool {
  threads: usize,
  pool: Arc<OnceLock<rayon::ThreadPool>>,
}

impl WorkerPool {
  pub fn new(threads: usize) -> Self {
    Self {
      threads: threads.max(1),
      pool: Arc::new(OnceLock::new()),
    }
  }

  pub fn threads(&self) -> usize {
    self.threads
  }

  fn runs_parallel(&self, items: usize, config: &Config) -> bool {
    self.threads > 1 && items >= config.parallel_min_employees
  }

  pub fn pool(&self) -> Result<&rayon::ThreadPool, EngineError> {
    if let Some(pool) = self.pool.get() {
      return Ok(pool);
    }
    let built = rayon::ThreadPoolBuilder::new()
      .num_threads(self.threads)
      .thread_name(|i| format!("skill-gap-{}", i))
      .build()
      .map_err(|e| EngineError::worker_pool(e.to_string()))?;
    debug!(threads = self.threads, "started worker pool");
    // A concurrent caller may have won the race; its pool is used instead.
    let _ = self.pool.set(built);
    self
      .pool
      .get()
      .ok_or_else(|| EngineError::worker_pool("worker pool was not initialized"))
  }
}

fn summarize_one(input: &EmployeeInput, profiles: &ProfileIndex, config: &Config) -> EmployeeSummary {
  let department = input.department.as_deref().unwrap_or_default();
  employee::summarize_employee(input, profiles.for_department(department), config)
}

fn fold_sequential(summaries: &[EmployeeSummary], config: &Config) -> RollupAccumulator {
  summaries
    .iter()
    .fold(RollupAccumulator::default(), |acc, s| acc.add(s, config))
}

fn fold_parallel(summaries: &[EmployeeSummary], config: &Config) -> RollupAccumulator {
  summaries
    .par_iter()
    .fold(RollupAccumulator::default, |acc, s| acc.add(s, config))
    .reduce(RollupAccumulator::default, RollupAccumulator::merge)
}

/// Summarize every employee and accumulate the team-level rollup.
///
/// Summaries keep input order. Fails only if the worker pool cannot start.
pub fn summarize_all(
  employees: &[&EmployeeInput],
  profiles: &ProfileIndex,
  config: &Config,
  workers: &WorkerPool,
) -> Result<(Vec<EmployeeSummary>, RollupAccumulator), EngineError> {
  if !workers.runs_parallel(employees.len(), config) {
    debug!(employees = employees.len(), "summarizing sequentially");
    let summaries: Vec<EmployeeSummary> = employees
      .iter()
      .map(|e| summarize_one(e, profiles, config))
      .collect();
    let rollup = fold_sequential(&summaries, config);
    return Ok((summaries, rollup));
  }

  let pool = workers.pool()?;
  debug!(employees = employees.len(), workers = workers.threads(), "summarizing in parallel");

  Ok(pool.install(|| {
    let summaries: Vec<EmployeeSummary> = employees
      .par_iter()
      .map(|e| summarize_one(e, profiles, config))
      .collect();
    let rollup = fold_parallel(&summaries, config);
    (summaries, rollup)
  }))
}

/// Parallel counterpart of `cohort::rollup` for summaries computed elsewhere.
pub fn rollup_parallel(
  summaries: &[EmployeeSummary],
  organization_name: &str,
  config: &Config,
  workers: &WorkerPool,
) -> Result<Rollup, EngineError> {
  let acc = if workers.runs_parallel(summaries.len(), config) {
    workers.pool()?.install(|| fold_parallel(summaries, config))
  } else {
    fold_sequential(summaries, config)
  };
  Ok(acc.finish(organization_name, config))
}
