//! Core types for the skill gap engine (JSON contracts + internal models).

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::Config;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract: what the caller sends)
// ---------------------------------------------------------------------------

/// One employee as supplied by the directory + assessment pipeline.
/// The skill matrix is kept as raw JSON; shape detection happens in `normalize`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeInput {
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub department: Option<String>,
  #[serde(default)]
  pub team: Option<String>,
  #[serde(default, alias = "jobTitle")]
  pub job_title: Option<String>,
  #[serde(default, alias = "skillMatrix")]
  pub skill_matrix: Value,
  #[serde(default, alias = "idealProfile")]
  pub ideal_profile: Option<Value>,
}

/// Restricts a report to one department and optionally one team within it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub department: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub team: Option<String>,
}

impl Scope {
  pub fn organization() -> Self {
    Self::default()
  }

  pub fn department(name: impl Into<String>) -> Self {
    Self {
      department: Some(name.into()),
      team: None,
    }
  }

  /// Human-readable label used as the organization cohort name.
  pub fn label(&self) -> String {
    match (&self.department, &self.team) {
      (Some(d), Some(t)) => format!("{}/{}", d, t),
      (Some(d), None) => d.clone(),
      (None, Some(t)) => t.clone(),
      (None, None) => "organization".to_string(),
    }
  }

  pub fn contains(&self, employee: &EmployeeInput) -> bool {
    fn matches(filter: &Option<String>, value: &Option<String>) -> bool {
      match filter {
        None => true,
        Some(f) => value
          .as_deref()
          .map(|v| v.trim().eq_ignore_ascii_case(f.trim()))
          .unwrap_or(false),
      }
    }
    matches(&self.department, &employee.department) && matches(&self.team, &employee.team)
  }
}

/// Full request accepted by the harness binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
  pub employees: Vec<EmployeeInput>,
  /// Ideal profiles keyed by department name (same shape as a skill matrix).
  #[serde(default, alias = "idealProfiles")]
  pub ideal_profiles: BTreeMap<String, Value>,
  #[serde(default)]
  pub scope: Scope,
  #[serde(default)]
  pub config: Option<Config>,
}

// ---------------------------------------------------------------------------
// Skill type (normalized)
// ---------------------------------------------------------------------------

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SkillType {
  Technical,
  SoftSkill,
  DomainKnowledge,
  Sop,
  Unspecified,
}

/// Category name fragments that mark a category as soft skills.
const SOFT_SKILL_MARKERS: [&str; 5] = [
  "soft_skills",
  "communication",
  "leadership",
  "teamwork",
  "management",
];

impl SkillType {
  /// Parse an explicit `skill_type` value. Blank values return `None` so the
  /// caller falls back to category inference; unknown values are `Unspecified`.
  pub fn from_explicit(s: &str) -> Option<Self> {
    let s = s.trim().to_ascii_lowercase();
    if s.is_empty() {
      return None;
    }
    Some(match s.as_str() {
      "technical" | "tech" => Self::Technical,
      "soft_skill" | "soft_skills" | "soft" => Self::SoftSkill,
      "domain_knowledge" | "domain" => Self::DomainKnowledge,
      "sop" | "sops" => Self::Sop,
      _ => Self::Unspecified,
    })
  }

  pub fn infer_from_category(category: &str) -> Self {
    let c = category.to_ascii_lowercase();
    if SOFT_SKILL_MARKERS.iter().any(|m| c.contains(m)) {
      Self::SoftSkill
    } else if c.contains("domain_knowledge") {
      Self::DomainKnowledge
    } else {
      Self::Technical
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Technical => "technical",
      Self::SoftSkill => "soft_skill",
      Self::DomainKnowledge => "domain_knowledge",
      Self::Sop => "sop",
      Self::Unspecified => "unspecified",
    }
  }

  /// Bucket used for per-type tallies and report sections. Unrecognized
  /// explicit types count as SOP.
  pub fn reported(self) -> Self {
    match self {
      Self::Unspecified => Self::Sop,
      other => other,
    }
  }
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// Canonical skill record after normalization. Levels are clamped to 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillRecord {
  pub name: String,
  pub category: String,
  pub competency: u8,
  pub competency_level: u8,
  pub skill_type: SkillType,
}

/// Target-based gap for one skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapResult {
  pub skill: SkillRecord,
  pub gap_percent: u8,
  pub has_gap: bool,
}

/// A target-based gap retained on an employee summary for cohort fan-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillGap {
  pub skill_name: String,
  pub category: String,
  pub skill_type: SkillType,
  pub competency: u8,
  pub target: u8,
  pub gap: u8,
}

/// Skill and coarse-gap counts for one skill type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
  pub skills: u32,
  pub gaps: u32,
}

impl CategoryTally {
  pub fn merge(self, other: Self) -> Self {
    Self {
      skills: self.skills + other.skills,
      gaps: self.gaps + other.gaps,
    }
  }
}

/// Per-type tallies. `sop` also absorbs `unspecified` skills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTallies {
  pub technical: CategoryTally,
  pub soft_skill: CategoryTally,
  pub domain_knowledge: CategoryTally,
  pub sop: CategoryTally,
}

impl CategoryTallies {
  pub fn tally_mut(&mut self, skill_type: SkillType) -> &mut CategoryTally {
    match skill_type.reported() {
      SkillType::Technical => &mut self.technical,
      SkillType::SoftSkill => &mut self.soft_skill,
      SkillType::DomainKnowledge => &mut self.domain_knowledge,
      SkillType::Sop | SkillType::Unspecified => &mut self.sop,
    }
  }

  pub fn merge(self, other: Self) -> Self {
    Self {
      technical: self.technical.merge(other.technical),
      soft_skill: self.soft_skill.merge(other.soft_skill),
      domain_knowledge: self.domain_knowledge.merge(other.domain_knowledge),
      sop: self.sop.merge(other.sop),
    }
  }
}

// ---------------------------------------------------------------------------
// Employee summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
  pub employee_id: String,
  pub employee_name: String,
  pub department: String,
  pub team: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub job_title: Option<String>,
  pub total_skills: u32,
  /// Target-based gaps (`competency < competency_level`).
  pub skills_with_gaps: u32,
  /// Coarse dashboard gaps (`competency < coarse_gap_threshold`).
  pub skills_below_threshold: u32,
  pub average_competency: f64,
  pub technical_skills: u32,
  pub soft_skills: u32,
  pub domain_knowledge_skills: u32,
  pub sop_skills: u32,
  pub tallies: CategoryTallies,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub gaps: Vec<SkillGap>,
  pub has_data: bool,
}

// ---------------------------------------------------------------------------
// Cohort summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortLevel {
  Team,
  Department,
  Organization,
}

/// Percentage of skills per type without a coarse gap (1 decimal).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Coverage {
  pub technical: f64,
  pub soft_skills: f64,
  pub domain_knowledge: f64,
  pub sop: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
  pub level: CohortLevel,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub department: Option<String>,
  pub employee_count: u32,
  pub assessed_employee_count: u32,
  /// Mean of member `average_competency` values (mean-of-means).
  pub avg_competency: f64,
  pub total_skills: u64,
  pub total_gaps: u64,
  pub skills_below_threshold: u64,
  /// Members whose average competency is below the critical employee threshold.
  pub critical_employees: u32,
  /// High-impact gaps in this cohort at or above the critical risk level.
  pub critical_gaps: u32,
  pub coverage: Coverage,
  pub has_data: bool,
}

impl CohortSummary {
  pub fn empty(level: CohortLevel, name: impl Into<String>) -> Self {
    Self {
      level,
      name: name.into(),
      department: None,
      employee_count: 0,
      assessed_employee_count: 0,
      avg_competency: 0.0,
      total_skills: 0,
      total_gaps: 0,
      skills_below_threshold: 0,
      critical_employees: 0,
      critical_gaps: 0,
      coverage: Coverage::default(),
      has_data: false,
    }
  }
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

/// Discrete risk level, serialized as its integer (1 = minimal, 5 = critical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
  Minimal = 1,
  Low = 2,
  Moderate = 3,
  High = 4,
  Critical = 5,
}

impl RiskLevel {
  pub fn level(self) -> u8 {
    self as u8
  }
}

impl Serialize for RiskLevel {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(self.level())
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract: what we emit)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffectedEmployee {
  pub employee_id: String,
  pub employee_name: String,
  pub current_competency: u8,
  pub target_competency: u8,
  pub gap: u8,
}

/// One skill (name + category) gap aggregated across a cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighImpactGap {
  pub gap_id: String,
  pub skill_name: String,
  pub category: String,
  pub skill_type: SkillType,
  pub affected_employee_count: usize,
  pub average_gap_percentage: f64,
  pub max_gap_percentage: u8,
  pub risk_level: RiskLevel,
  pub affected_employees: Vec<AffectedEmployee>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub recommended_actions: Vec<String>,
}

/// SOP-type gap surfaced for compliance views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRisk {
  pub gap_id: String,
  pub skill_name: String,
  pub category: String,
  pub non_compliant_employees: usize,
  pub average_gap_percentage: f64,
  pub risk_level: RiskLevel,
  pub employee_ids: Vec<String>,
}

/// One employee-level priority gap listed under its skill type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalGapEntry {
  pub employee_id: String,
  pub employee_name: String,
  pub skill_name: String,
  pub category: String,
  pub competency: u8,
  pub target: u8,
  pub gap: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverviewMetrics {
  pub total_employees: u32,
  pub assessed_employees: u32,
  pub total_skills: u64,
  pub average_competency: f64,
  pub total_gaps: u64,
  pub skills_below_threshold: u64,
  pub priority_gaps: u64,
  pub critical_employees: u32,
  pub critical_gaps: u32,
  pub high_impact_gap_count: usize,
  pub department_count: usize,
  pub team_count: usize,
  pub coverage: Coverage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
  pub generated_at: String,
  pub scope: Scope,
  pub has_data: bool,
  pub overview: OverviewMetrics,
  pub organization: CohortSummary,
  pub departments: Vec<CohortSummary>,
  pub teams: Vec<CohortSummary>,
  pub critical_gaps: BTreeMap<SkillType, Vec<CriticalGapEntry>>,
  pub high_impact_gaps: Vec<HighImpactGap>,
  pub compliance_risks: Vec<ComplianceRisk>,
  pub employees: Vec<EmployeeSummary>,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output written when a request cannot be processed.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
