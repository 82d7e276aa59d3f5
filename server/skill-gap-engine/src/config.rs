//! Engine configuration with sane defaults.
//!
//! Every field may be supplied as JSON; omitted fields keep their default.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::EngineError;
use crate::types::{RiskLevel, SkillType};

/// Environment variable naming a JSON config file for the harness binary.
pub const CONFIG_ENV: &str = "SKILL_GAP_CONFIG";

/// Tunable thresholds for gap detection, risk classification and rollups.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Target level when neither the skill nor an ideal profile supplies one.
  pub default_target: u8,
  /// Fixed threshold for coarse dashboard gap counts and coverage.
  pub coarse_gap_threshold: u8,
  /// A gap is a priority gap when the employee's competency is below this.
  pub priority_competency_threshold: u8,
  /// Employees whose average competency falls below this are critical.
  pub critical_employee_threshold: f64,
  /// Average gap percentage for risk level 4 (and 5 with broad impact).
  pub risk_severe_gap: f64,
  /// Average gap percentage for risk level 3.
  pub risk_moderate_gap: f64,
  /// Average gap percentage for risk level 2.
  pub risk_low_gap: f64,
  /// Affected-employee count that must be exceeded for risk level 5.
  pub broad_impact_employees: usize,
  /// Gaps at or above this risk level count as critical gaps.
  pub critical_risk_level: u8,
  /// Business-criticality multiplier per category (case-insensitive). Default 1.0.
  pub category_weights: BTreeMap<String, f64>,
  pub recommended_actions: ActionCatalog,
  /// Maximum high-impact gaps listed in a report.
  pub high_impact_limit: usize,
  /// Worker threads for batch runs; `None` uses the number of CPUs.
  pub worker_threads: Option<usize>,
  /// Below this many employees the sequential path is used.
  pub parallel_min_employees: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      default_target: 70,
      coarse_gap_threshold: 70,
      priority_competency_threshold: 60,
      critical_employee_threshold: 60.0,
      risk_severe_gap: 40.0,
      risk_moderate_gap: 25.0,
      risk_low_gap: 10.0,
      broad_impact_employees: 5,
      critical_risk_level: 4,
      category_weights: BTreeMap::new(),
      recommended_actions: ActionCatalog::default(),
      high_impact_limit: 10,
      worker_threads: None,
      parallel_min_employees: 64,
    }
  }
}

impl Config {
  /// Load from the file named by `SKILL_GAP_CONFIG`, or defaults when unset.
  pub fn load() -> Result<Self, EngineError> {
    match std::env::var(CONFIG_ENV) {
      Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim())),
      _ => Ok(Self::default()),
    }
  }

  pub fn from_file(path: &Path) -> Result<Self, EngineError> {
    let raw = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&raw)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), EngineError> {
    for (field, value) in [
      ("default_target", self.default_target),
      ("coarse_gap_threshold", self.coarse_gap_threshold),
      ("priority_competency_threshold", self.priority_competency_threshold),
    ] {
      if value > 100 {
        return Err(EngineError::config(field, "must be within 0..=100"));
      }
    }

    for (field, value) in [
      ("critical_employee_threshold", self.critical_employee_threshold),
      ("risk_severe_gap", self.risk_severe_gap),
      ("risk_moderate_gap", self.risk_moderate_gap),
      ("risk_low_gap", self.risk_low_gap),
    ] {
      if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(EngineError::config(field, "must be within 0..=100"));
      }
    }

    if self.risk_low_gap > self.risk_moderate_gap || self.risk_moderate_gap > self.risk_severe_gap {
      return Err(EngineError::config(
        "risk_*_gap",
        "expected risk_low_gap <= risk_moderate_gap <= risk_severe_gap",
      ));
    }

    if !(1..=5).contains(&self.critical_risk_level) {
      return Err(EngineError::config("critical_risk_level", "must be within 1..=5"));
    }

    if let Some((category, _)) = self
      .category_weights
      .iter()
      .find(|(_, w)| !w.is_finite() || **w <= 0.0)
    {
      return Err(EngineError::config(
        "category_weights",
        &format!("weight for {:?} must be a positive number", category),
      ));
    }

    if let Some(rule) = self
      .recommended_actions
      .rules
      .iter()
      .find(|r| !(1..=5).contains(&r.min_risk))
    {
      return Err(EngineError::config(
        "recommended_actions",
        &format!("min_risk {} must be within 1..=5", rule.min_risk),
      ));
    }

    if self.worker_threads == Some(0) {
      return Err(EngineError::config("worker_threads", "must be at least 1"));
    }

    Ok(())
  }

  /// Business-criticality weight for a category.
  pub fn category_weight(&self, category: &str) -> f64 {
    let category = category.trim();
    self
      .category_weights
      .iter()
      .find(|(k, _)| k.trim().eq_ignore_ascii_case(category))
      .map(|(_, w)| *w)
      .unwrap_or(1.0)
  }

  pub fn worker_count(&self) -> usize {
    self.worker_threads.unwrap_or_else(num_cpus::get).max(1)
  }

  pub fn is_critical_risk(&self, risk: RiskLevel) -> bool {
    risk.level() >= self.critical_risk_level
  }
}

// ---------------------------------------------------------------------------
// Recommended actions
// ---------------------------------------------------------------------------

/// One lookup row: applies to `skill_type` (or any type when `None`) at
/// `min_risk` and above.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionRule {
  #[serde(default)]
  pub skill_type: Option<SkillType>,
  pub min_risk: u8,
  pub actions: Vec<String>,
}

/// Fixed lookup of recommended actions keyed by skill type and risk level.
/// Rules are checked in order; the first match wins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ActionCatalog {
  pub rules: Vec<ActionRule>,
}

impl ActionCatalog {
  pub fn lookup(&self, skill_type: SkillType, risk: RiskLevel) -> Vec<String> {
    self
      .rules
      .iter()
      .find(|r| r.skill_type.map_or(true, |t| t == skill_type) && risk.level() >= r.min_risk)
      .map(|r| r.actions.clone())
      .unwrap_or_default()
  }
}

fn rule(skill_type: Option<SkillType>, min_risk: u8, actions: &[&str]) -> ActionRule {
  ActionRule {
    skill_type,
    min_risk,
    actions: actions.iter().map(|a| a.to_string()).collect(),
  }
}

impl Default for ActionCatalog {
  fn default() -> Self {
    use SkillType::*;
    Self {
      rules: vec![
        rule(
          Some(Technical),
          4,
          &[
            "Schedule structured technical training for affected employees",
            "Pair affected employees with a senior practitioner on live work",
            "Reassess within 60 days",
          ],
        ),
        rule(
          Some(Technical),
          2,
          &[
            "Assign self-paced learning modules",
            "Add the skill to individual development plans",
          ],
        ),
        rule(
          Some(SoftSkill),
          4,
          &[
            "Enroll affected employees in a facilitated workshop",
            "Set up regular coaching sessions with their managers",
          ],
        ),
        rule(
          Some(SoftSkill),
          2,
          &["Provide peer feedback and mentoring opportunities"],
        ),
        rule(
          Some(DomainKnowledge),
          4,
          &[
            "Run domain knowledge sessions led by subject matter experts",
            "Document key domain processes in a shared knowledge base",
          ],
        ),
        rule(
          Some(DomainKnowledge),
          2,
          &["Share curated domain reading material"],
        ),
        rule(
          Some(Sop),
          3,
          &[
            "Require SOP refresher training and sign-off",
            "Audit adherence to the affected procedures",
          ],
        ),
        rule(Some(Sop), 1, &["Circulate the current SOP revision for review"]),
        rule(
          None,
          4,
          &[
            "Prioritize this skill in the next training cycle",
            "Review staffing for work that depends on this skill",
          ],
        ),
        rule(None, 1, &["Monitor in the next assessment cycle"]),
      ],
    }
  }
}
