//! Cohort rollups: team, department and organization summaries.
//!
//! The same accumulator is used at every level. `merge` is commutative and
//! associative, so employees may arrive in any order and partial rollups built
//! on different workers combine to the same result as a sequential fold.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::gap_id;
use crate::risk;
use crate::stats::{coverage_percent, mean_of_tenths, round1, to_tenths};
use crate::types::{
  AffectedEmployee, CategoryTallies, CohortLevel, CohortSummary, Coverage, EmployeeSummary,
  HighImpactGap, RiskLevel, SkillType,
};

/// (category, skill name)
type GapKey = (String, String);

#[derive(Debug, Clone)]
struct GapAccumulator {
  skill_type: SkillType,
  gap_sum: u64,
  max_gap: u8,
  affected: Vec<AffectedEmployee>,
}

impl GapAccumulator {
  fn merge(mut self, other: Self) -> Self {
    self.skill_type = self.skill_type.min(other.skill_type);
    self.gap_sum += other.gap_sum;
    self.max_gap = self.max_gap.max(other.max_gap);
    self.affected.extend(other.affected);
    self
  }

  fn average_gap(&self) -> f64 {
    if self.affected.is_empty() {
      0.0
    } else {
      round1(self.gap_sum as f64 / self.affected.len() as f64)
    }
  }

  fn risk(&self, category: &str, config: &Config) -> RiskLevel {
    risk::classify(self.average_gap(), self.affected.len(), category, config)
  }
}

/// Partial cohort state. Build one per employee and `merge` them.
#[derive(Debug, Clone, Default)]
pub struct CohortAccumulator {
  employee_count: u32,
  assessed_count: u32,
  /// Sum of member averages in tenths, exact under any summation order.
  competency_tenths: u64,
  total_skills: u64,
  total_gaps: u64,
  below_threshold: u64,
  critical_employees: u32,
  tallies: CategoryTallies,
  gaps: BTreeMap<GapKey, GapAccumulator>,
}

impl CohortAccumulator {
  pub fn from_employee(summary: &EmployeeSummary, config: &Config) -> Self {
    let mut acc = Self {
      employee_count: 1,
      ..Self::default()
    };
    // Members without assessment data count toward the headcount only.
    if !summary.has_data {
      return acc;
    }

    acc.assessed_count = 1;
    acc.competency_tenths = to_tenths(summary.average_competency);
    acc.total_skills = u64::from(summary.total_skills);
    acc.total_gaps = u64::from(summary.skills_with_gaps);
    acc.below_threshold = u64::from(summary.skills_below_threshold);
    if summary.average_competency < config.critical_employee_threshold {
      acc.critical_employees = 1;
    }
    acc.tallies = summary.tallies;

    for gap in &summary.gaps {
      let entry = GapAccumulator {
        skill_type: gap.skill_type,
        gap_sum: u64::from(gap.gap),
        max_gap: gap.gap,
        affected: vec![AffectedEmployee {
          employee_id: summary.employee_id.clone(),
          employee_name: summary.employee_name.clone(),
          current_competency: gap.competency,
          target_competency: gap.target,
          gap: gap.gap,
        }],
      };
      let key = (gap.category.clone(), gap.skill_name.clone());
      // A skill listed twice for one employee keeps its larger gap.
      match acc.gaps.get(&key) {
        Some(existing) if existing.max_gap >= gap.gap => {}
        _ => {
          acc.gaps.insert(key, entry);
        }
      }
    }
    acc
  }

  pub fn merge(mut self, other: Self) -> Self {
    self.employee_count += other.employee_count;
    self.assessed_count += other.assessed_count;
    self.competency_tenths += other.competency_tenths;
    self.total_skills += other.total_skills;
    self.total_gaps += other.total_gaps;
    self.below_threshold += other.below_threshold;
    self.critical_employees += other.critical_employees;
    self.tallies = self.tallies.merge(other.tallies);
    for (key, gap) in other.gaps {
      let merged = match self.gaps.remove(&key) {
        Some(existing) => existing.merge(gap),
        None => gap,
      };
      self.gaps.insert(key, merged);
    }
    self
  }

  pub fn finish(&self, level: CohortLevel, name: &str, config: &Config) -> CohortSummary {
    let critical_gaps = self
      .gaps
      .iter()
      .filter(|((category, _), gap)| config.is_critical_risk(gap.risk(category, config)))
      .count() as u32;

    CohortSummary {
      level,
      name: name.to_string(),
      department: None,
      employee_count: self.employee_count,
      assessed_employee_count: self.assessed_count,
      avg_competency: mean_of_tenths(self.competency_tenths, self.assessed_count),
      total_skills: self.total_skills,
      total_gaps: self.total_gaps,
      skills_below_threshold: self.below_threshold,
      critical_employees: self.critical_employees,
      critical_gaps,
      coverage: Coverage {
        technical: coverage_percent(self.tallies.technical.skills, self.tallies.technical.gaps),
        soft_skills: coverage_percent(self.tallies.soft_skill.skills, self.tallies.soft_skill.gaps),
        domain_knowledge: coverage_percent(
          self.tallies.domain_knowledge.skills,
          self.tallies.domain_knowledge.gaps,
        ),
        sop: coverage_percent(self.tallies.sop.skills, self.tallies.sop.gaps),
      },
      has_data: self.assessed_count > 0,
    }
  }

  /// One entry per distinct (category, skill name), in key order. Affected
  /// employees are sorted by gap descending, then employee id.
  pub fn high_impact_gaps(&self, config: &Config) -> Vec<HighImpactGap> {
    self
      .gaps
      .iter()
      .map(|((category, skill_name), gap)| {
        let mut affected = gap.affected.clone();
        affected.sort_by(|a, b| {
          b.gap
            .cmp(&a.gap)
            .then_with(|| a.employee_id.cmp(&b.employee_id))
            .then_with(|| a.current_competency.cmp(&b.current_competency))
        });
        HighImpactGap {
          gap_id: gap_id::compute(category, skill_name),
          skill_name: skill_name.clone(),
          category: category.clone(),
          skill_type: gap.skill_type,
          affected_employee_count: affected.len(),
          average_gap_percentage: gap.average_gap(),
          max_gap_percentage: gap.max_gap,
          risk_level: gap.risk(category, config),
          affected_employees: affected,
          recommended_actions: Vec::new(),
        }
      })
      .collect()
  }
}

/// Summarize one cohort from its members.
pub fn summarize_cohort(
  level: CohortLevel,
  name: &str,
  members: &[EmployeeSummary],
  config: &Config,
) -> CohortSummary {
  members
    .iter()
    .map(|m| CohortAccumulator::from_employee(m, config))
    .fold(CohortAccumulator::default(), CohortAccumulator::merge)
    .finish(level, name, config)
}

// ---------------------------------------------------------------------------
// Organization rollup
// ---------------------------------------------------------------------------

/// Finished rollup for every level.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollup {
  pub organization: CohortSummary,
  /// Sorted by case-folded department name.
  pub departments: Vec<CohortSummary>,
  /// Sorted by case-folded (department, team).
  pub teams: Vec<CohortSummary>,
  /// Organization-wide gaps, unranked.
  pub high_impact_gaps: Vec<HighImpactGap>,
}

/// Accumulator plus the display name for a case-insensitive group.
#[derive(Debug, Clone)]
struct Named {
  /// Smallest spelling seen, so merges stay order independent.
  name: String,
  acc: CohortAccumulator,
}

impl Named {
  fn merge(self, other: Self) -> Self {
    Self {
      name: self.name.min(other.name),
      acc: self.acc.merge(other.acc),
    }
  }
}

fn merge_into<K: Ord>(map: &mut BTreeMap<K, Named>, key: K, value: Named) {
  let merged = match map.remove(&key) {
    Some(existing) => existing.merge(value),
    None => value,
  };
  map.insert(key, merged);
}

#[derive(Debug, Clone)]
struct TeamPartial {
  department: String,
  team: Named,
}

impl TeamPartial {
  fn merge(self, other: Self) -> Self {
    Self {
      department: self.department.min(other.department),
      team: self.team.merge(other.team),
    }
  }
}

/// Per-team partial state, keyed by case-folded (department, team).
/// Departments and the organization are derived from teams when the rollup is
/// finished.
#[derive(Debug, Clone, Default)]
pub struct RollupAccumulator {
  teams: BTreeMap<(String, String), TeamPartial>,
}

impl RollupAccumulator {
  pub fn add(self, summary: &EmployeeSummary, config: &Config) -> Self {
    let key = (summary.department.to_lowercase(), summary.team.to_lowercase());
    let member = TeamPartial {
      department: summary.department.clone(),
      team: Named {
        name: summary.team.clone(),
        acc: CohortAccumulator::from_employee(summary, config),
      },
    };
    self.insert(key, member)
  }

  pub fn merge(mut self, other: Self) -> Self {
    for (key, partial) in other.teams {
      self = self.insert(key, partial);
    }
    self
  }

  fn insert(mut self, key: (String, String), partial: TeamPartial) -> Self {
    let merged = match self.teams.remove(&key) {
      Some(existing) => existing.merge(partial),
      None => partial,
    };
    self.teams.insert(key, merged);
    self
  }

  pub fn employee_count(&self) -> u32 {
    self.teams.values().map(|t| t.team.acc.employee_count).sum()
  }

  /// Teams, then departments, then organization. Each level is merged from the one below.
  pub fn finish(self, organization_name: &str, config: &Config) -> Rollup {
    let mut partials = Vec::with_capacity(self.teams.len());
    let mut departments: BTreeMap<String, Named> = BTreeMap::new();

    for ((department_key, _), partial) in self.teams {
      merge_into(
        &mut departments,
        department_key.clone(),
        Named {
          name: partial.department.clone(),
          acc: partial.team.acc.clone(),
        },
      );
      partials.push((department_key, partial.team));
    }

    // Teams carry the department's canonical spelling, which is only known
    // once every team has been folded in.
    let mut teams = Vec::with_capacity(partials.len());
    for (department_key, team) in partials {
      let mut summary = team.acc.finish(CohortLevel::Team, &team.name, config);
      summary.department = departments.get(&department_key).map(|d| d.name.clone());
      teams.push(summary);
    }

    let mut organization = CohortAccumulator::default();
    let mut department_summaries = Vec::with_capacity(departments.len());
    for department in departments.into_values() {
      department_summaries.push(department.acc.finish(
        CohortLevel::Department,
        &department.name,
        config,
      ));
      organization = organization.merge(department.acc);
    }

    Rollup {
      organization: organization.finish(CohortLevel::Organization, organization_name, config),
      departments: department_summaries,
      teams,
      high_impact_gaps: organization.high_impact_gaps(config),
    }
  }
}

/// Sequential rollup over a set of employee summaries.
pub fn rollup(summaries: &[EmployeeSummary], organization_name: &str, config: &Config) -> Rollup {
  summaries
    .iter()
    .fold(RollupAccumulator::default(), |acc, s| acc.add(s, config))
    .finish(organization_name, config)
}
