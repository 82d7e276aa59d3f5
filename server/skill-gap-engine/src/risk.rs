//! Risk level classification for aggregated skill gaps.

use crate::config::Config;
use crate::types::{RiskLevel, SkillGap};

/// Classify an aggregated gap. Thresholds are checked in priority order and the
/// first match wins. The average gap is scaled by the category's
/// business-criticality weight before comparison.
pub fn classify(
  average_gap_percentage: f64,
  affected_employees: usize,
  category: &str,
  config: &Config,
) -> RiskLevel {
  let weighted = average_gap_percentage * config.category_weight(category);

  if weighted >= config.risk_severe_gap && affected_employees > config.broad_impact_employees {
    RiskLevel::Critical
  } else if weighted >= config.risk_severe_gap {
    RiskLevel::High
  } else if weighted >= config.risk_moderate_gap {
    RiskLevel::Moderate
  } else if weighted >= config.risk_low_gap {
    RiskLevel::Low
  } else {
    RiskLevel::Minimal
  }
}

/// Priority gaps are a coarser dashboard notion than risk levels: any gap
/// where the employee's current competency is below the priority threshold.
pub fn is_priority_gap(gap: &SkillGap, config: &Config) -> bool {
  gap.gap > 0 && gap.competency < config.priority_competency_threshold
}
