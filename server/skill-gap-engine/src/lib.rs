//! Skill Gap Engine: deterministic, rule-based competency aggregation.
//!
//! Normalizes loosely-typed skill matrix documents, computes per-skill gaps,
//! rolls employees up into team/department/organization cohorts, ranks
//! high-impact gaps by risk level, and emits report-ready summaries.
//!
//! No DB, no network; pure computation over an in-memory snapshot.

pub mod batch;
pub mod cohort;
pub mod config;
pub mod employee;
pub mod engine;
pub mod error;
pub mod gap;
pub mod gap_id;
pub mod normalize;
pub mod report;
pub mod risk;
pub mod stats;
pub mod types;

pub use config::Config;
pub use engine::Engine;
pub use error::EngineError;
pub use types::{AnalysisRequest, EmployeeInput, EmployeeSummary, GapReport, SkillRecord};
