//! Fold one employee's normalized skills into an EmployeeSummary.

use crate::config::Config;
use crate::gap;
use crate::normalize::{self, IdealProfile, TargetContext};
use crate::stats::round1;
use crate::types::{EmployeeInput, EmployeeSummary, SkillGap, SkillRecord, SkillType};

/// Grouping label for employees without a department or team.
pub const UNASSIGNED: &str = "Unassigned";

fn group_label(value: &Option<String>) -> String {
  value
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .unwrap_or(UNASSIGNED)
    .to_string()
}

/// Normalize an employee's raw matrix and summarize it.
///
/// Targets missing from a skill come from the employee's own ideal profile,
/// then `cohort_profile`, then `config.default_target`.
pub fn summarize_employee(
  input: &EmployeeInput,
  cohort_profile: Option<&IdealProfile>,
  config: &Config,
) -> EmployeeSummary {
  let own_profile = input.ideal_profile.as_ref().map(IdealProfile::from_matrix);
  let ctx = TargetContext::new(config.default_target)
    .with_employee_profile(own_profile.as_ref())
    .with_cohort_profile(cohort_profile);
  let records = normalize::normalize_matrix(&input.skill_matrix, &ctx);
  summarize_records(input, records, config)
}

/// Single pass over already-normalized records.
pub fn summarize_records(
  input: &EmployeeInput,
  records: Vec<SkillRecord>,
  config: &Config,
) -> EmployeeSummary {
  let employee_name = if input.name.trim().is_empty() {
    input.id.clone()
  } else {
    input.name.trim().to_string()
  };

  let mut summary = EmployeeSummary {
    employee_id: input.id.clone(),
    employee_name,
    department: group_label(&input.department),
    team: group_label(&input.team),
    job_title: input.job_title.clone(),
    total_skills: 0,
    skills_with_gaps: 0,
    skills_below_threshold: 0,
    average_competency: 0.0,
    technical_skills: 0,
    soft_skills: 0,
    domain_knowledge_skills: 0,
    sop_skills: 0,
    tallies: Default::default(),
    gaps: Vec::new(),
    has_data: false,
  };
  let mut competency_sum: u64 = 0;

  for record in records {
    let coarse_gap = gap::below_threshold(&record, config.coarse_gap_threshold);
    let result = gap::compute_gap(record);
    let skill = &result.skill;

    summary.total_skills += 1;
    competency_sum += u64::from(skill.competency);

    match skill.skill_type {
      SkillType::Technical => summary.technical_skills += 1,
      SkillType::SoftSkill => summary.soft_skills += 1,
      SkillType::DomainKnowledge => summary.domain_knowledge_skills += 1,
      SkillType::Sop | SkillType::Unspecified => {}
    }

    let tally = summary.tallies.tally_mut(skill.skill_type);
    tally.skills += 1;
    if coarse_gap {
      tally.gaps += 1;
      summary.skills_below_threshold += 1;
    }

    if result.has_gap {
      summary.skills_with_gaps += 1;
      summary.gaps.push(SkillGap {
        skill_name: skill.name.clone(),
        category: skill.category.clone(),
        skill_type: skill.skill_type,
        competency: skill.competency,
        target: skill.competency_level,
        gap: result.gap_percent,
      });
    }
  }

  summary.sop_skills = summary.total_skills
    - summary.technical_skills
    - summary.soft_skills
    - summary.domain_knowledge_skills;
  summary.average_competency = if summary.total_skills == 0 {
    0.0
  } else {
    round1(competency_sum as f64 / f64::from(summary.total_skills))
  };
  summary.has_data = summary.total_skills > 0;
  summary
}
