//! Assemble dashboard/report structures from a finished rollup.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

use crate::cohort::Rollup;
use crate::config::Config;
use crate::risk;
use crate::types::{
  CohortLevel, CohortSummary, ComplianceRisk, CriticalGapEntry, EmployeeSummary, GapReport,
  HighImpactGap, OverviewMetrics, Scope, SkillType,
};

/// Skill types always present as keys in `critical_gaps`, even when empty.
const REPORTED_SKILL_TYPES: [SkillType; 4] = [
  SkillType::Technical,
  SkillType::SoftSkill,
  SkillType::DomainKnowledge,
  SkillType::Sop,
];

fn empty_critical_gaps() -> BTreeMap<SkillType, Vec<CriticalGapEntry>> {
  REPORTED_SKILL_TYPES.iter().map(|t| (*t, Vec::new())).collect()
}

impl GapReport {
  /// Well-formed report for a scope without assessment data.
  pub fn empty(scope: Scope, generated_at: DateTime<Utc>) -> Self {
    let organization = CohortSummary::empty(CohortLevel::Organization, scope.label());
    Self {
      generated_at: generated_at.to_rfc3339(),
      scope,
      has_data: false,
      overview: OverviewMetrics::default(),
      organization,
      departments: Vec::new(),
      teams: Vec::new(),
      critical_gaps: empty_critical_gaps(),
      high_impact_gaps: Vec::new(),
      compliance_risks: Vec::new(),
      employees: Vec::new(),
    }
  }
}

/// Sort by risk level desc, then average gap desc. Ties fall back to affected
/// count desc, then category and skill name for a deterministic order.
pub fn rank_high_impact(mut gaps: Vec<HighImpactGap>) -> Vec<HighImpactGap> {
  gaps.sort_by(|a, b| {
    b.risk_level
      .cmp(&a.risk_level)
      .then_with(|| {
        b.average_gap_percentage
          .partial_cmp(&a.average_gap_percentage)
          .unwrap_or(Ordering::Equal)
      })
      .then_with(|| b.affected_employee_count.cmp(&a.affected_employee_count))
      .then_with(|| a.category.cmp(&b.category))
      .then_with(|| a.skill_name.cmp(&b.skill_name))
  });
  gaps
}

/// Employee-level priority gaps grouped by skill type, largest gap first.
pub fn critical_gaps_by_type(
  employees: &[EmployeeSummary],
  config: &Config,
) -> BTreeMap<SkillType, Vec<CriticalGapEntry>> {
  let mut grouped = empty_critical_gaps();
  for employee in employees {
    for gap in employee.gaps.iter().filter(|g| risk::is_priority_gap(g, config)) {
      grouped.entry(gap.skill_type.reported()).or_default().push(CriticalGapEntry {
        employee_id: employee.employee_id.clone(),
        employee_name: employee.employee_name.clone(),
        skill_name: gap.skill_name.clone(),
        category: gap.category.clone(),
        competency: gap.competency,
        target: gap.target,
        gap: gap.gap,
      });
    }
  }
  for entries in grouped.values_mut() {
    entries.sort_by(|a, b| {
      b.gap
        .cmp(&a.gap)
        .then_with(|| a.employee_id.cmp(&b.employee_id))
        .then_with(|| a.skill_name.cmp(&b.skill_name))
    });
  }
  grouped
}

/// SOP-type gaps (including unrecognized types) surfaced for compliance
/// views, in the order given.
pub fn compliance_risks(ranked: &[HighImpactGap]) -> Vec<ComplianceRisk> {
  ranked
    .iter()
    .filter(|g| g.skill_type.reported() == SkillType::Sop)
    .map(|g| ComplianceRisk {
      gap_id: g.gap_id.clone(),
      skill_name: g.skill_name.clone(),
      category: g.category.clone(),
      non_compliant_employees: g.affected_employee_count,
      average_gap_percentage: g.average_gap_percentage,
      risk_level: g.risk_level,
      employee_ids: g
        .affected_employees
        .iter()
        .map(|a| a.employee_id.clone())
        .collect(),
    })
    .collect()
}

/// Build the final report. A scope without assessment data yields
/// `GapReport::empty` rather than an error.
pub fn build_report(
  scope: Scope,
  generated_at: DateTime<Utc>,
  employees: Vec<EmployeeSummary>,
  rollup: Rollup,
  config: &Config,
) -> GapReport {
  if !rollup.organization.has_data {
    debug!(scope = %scope.label(), "no assessment data in scope");
    return GapReport::empty(scope, generated_at);
  }

  let mut high_impact_gaps = rank_high_impact(rollup.high_impact_gaps);
  let compliance_risks = compliance_risks(&high_impact_gaps);
  let high_impact_gap_count = high_impact_gaps.len();
  high_impact_gaps.truncate(config.high_impact_limit);
  for gap in &mut high_impact_gaps {
    gap.recommended_actions = config
      .recommended_actions
      .lookup(gap.skill_type, gap.risk_level);
  }

  let critical_gaps = critical_gaps_by_type(&employees, config);
  let priority_gaps: u64 = critical_gaps.values().map(|v| v.len() as u64).sum();

  let org = &rollup.organization;
  let overview = OverviewMetrics {
    total_employees: org.employee_count,
    assessed_employees: org.assessed_employee_count,
    total_skills: org.total_skills,
    average_competency: org.avg_competency,
    total_gaps: org.total_gaps,
    skills_below_threshold: org.skills_below_threshold,
    priority_gaps,
    critical_employees: org.critical_employees,
    critical_gaps: org.critical_gaps,
    high_impact_gap_count,
    department_count: rollup.departments.len(),
    team_count: rollup.teams.len(),
    coverage: org.coverage,
  };
  debug!(
    employees = overview.total_employees,
    high_impact = high_impact_gap_count,
    priority_gaps,
    "built gap report"
  );

  GapReport {
    generated_at: generated_at.to_rfc3339(),
    scope,
    has_data: true,
    overview,
    organization: rollup.organization,
    departments: rollup.departments,
    teams: rollup.teams,
    critical_gaps,
    high_impact_gaps,
    compliance_risks,
    employees,
  }
}
