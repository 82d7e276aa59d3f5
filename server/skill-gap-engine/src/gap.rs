//! Per-skill gap computation.
//!
//! Two gap definitions exist and must stay separate:
//! - the target-based gap (`competency < competency_level`) feeds high-impact gaps,
//! - the coarse gap (`competency < coarse_gap_threshold`) feeds dashboard counts.

use crate::types::{GapResult, SkillRecord};

/// Target-based gap. Equality is not a gap; magnitude never goes negative.
pub fn compute_gap(skill: SkillRecord) -> GapResult {
  let has_gap = skill.competency < skill.competency_level;
  let gap_percent = skill.competency_level.saturating_sub(skill.competency);
  GapResult {
    skill,
    gap_percent,
    has_gap,
  }
}

/// Coarse dashboard gap against a fixed threshold.
pub fn below_threshold(skill: &SkillRecord, threshold: u8) -> bool {
  skill.competency < threshold
}
