//! Normalize raw skill matrix documents into canonical SkillRecord lists.
//!
//! Three historical category shapes are accepted and erased here:
//! - a list of skill objects,
//! - an object with a nested `skills` list,
//! - a single skill object carrying `name` (legacy).
//!
//! Nothing in this module fails: malformed categories are skipped, malformed
//! entries become placeholders and unparseable levels fall back to defaults.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::types::{SkillRecord, SkillType};

/// Name given to entries that are not usable skill objects.
pub const PLACEHOLDER_SKILL_NAME: &str = "Unknown Skill";

/// Categories that carry assessment metadata rather than skills.
const METADATA_CATEGORIES: [&str; 2] = ["sop_context", "domain_knowledge_context"];

const COMPETENCY_KEYS: [&str; 2] = ["competency", "current_level"];
const TARGET_KEYS: [&str; 3] = ["competencyLevel", "competency_level", "target_level"];
const SKILL_TYPE_KEYS: [&str; 2] = ["skill_type", "skillType"];

/// Structural shape of one category value.
enum CategoryShape<'a> {
  List(&'a [Value]),
  Nested(&'a [Value]),
  Single(&'a Value),
  Malformed,
}

fn detect_shape(value: &Value) -> CategoryShape<'_> {
  match value {
    Value::Array(items) => CategoryShape::List(items),
    Value::Object(obj) => match obj.get("skills") {
      Some(Value::Array(items)) => CategoryShape::Nested(items),
      _ if obj.contains_key("name") => CategoryShape::Single(value),
      _ => CategoryShape::Malformed,
    },
    _ => CategoryShape::Malformed,
  }
}

fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

pub fn is_metadata_category(category: &str) -> bool {
  let c = category.trim();
  METADATA_CATEGORIES.iter().any(|m| c.eq_ignore_ascii_case(m))
}

/// Candidate skill entries of one category, whatever its shape.
fn candidates<'a>(category: &str, value: &'a Value) -> Vec<&'a Value> {
  match detect_shape(value) {
    CategoryShape::List(items) | CategoryShape::Nested(items) => items.iter().collect(),
    CategoryShape::Single(skill) => vec![skill],
    CategoryShape::Malformed => {
      warn!(
        category,
        kind = value_kind(value),
        "skipping skill category with unrecognized shape"
      );
      Vec::new()
    }
  }
}

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

/// Parse a leading integer the way loosely-typed producers write them:
/// `"85"`, `" 40 "`, `"85%"`, `"72.6"` (truncated). `None` without digits.
fn parse_leading_int(s: &str) -> Option<i64> {
  let s = s.trim();
  let (negative, digits) = match s.strip_prefix('-') {
    Some(rest) => (true, rest),
    None => (false, s.strip_prefix('+').unwrap_or(s)),
  };
  let end = digits
    .char_indices()
    .find(|(_, c)| !c.is_ascii_digit())
    .map(|(i, _)| i)
    .unwrap_or(digits.len());
  if end == 0 {
    return None;
  }
  // Anything past 18 digits is far outside 0..=100 anyway.
  let magnitude: i64 = digits[..end.min(18)].parse().ok()?;
  Some(if negative { -magnitude } else { magnitude })
}

/// Coerce a numeric or string-encoded level into 0..=100. Out-of-range values
/// are clamped; non-numeric values return `None`.
pub fn coerce_level(value: &Value) -> Option<u8> {
  let raw: i64 = match value {
    Value::Number(n) => match n.as_i64() {
      Some(i) => i,
      None => n.as_f64()?.trunc().clamp(-1.0, 101.0) as i64,
    },
    Value::String(s) => parse_leading_int(s)?,
    _ => return None,
  };
  Some(raw.clamp(0, 100) as u8)
}

enum LevelField {
  Missing,
  Unparseable,
  Level(u8),
}

fn read_level(obj: &Map<String, Value>, keys: &[&str]) -> LevelField {
  match keys.iter().find_map(|k| obj.get(*k).filter(|v| !v.is_null())) {
    None => LevelField::Missing,
    Some(v) => coerce_level(v).map_or(LevelField::Unparseable, LevelField::Level),
  }
}

fn usable_name(obj: &Map<String, Value>) -> Option<&str> {
  obj
    .get("name")
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
}

fn explicit_skill_type(obj: &Map<String, Value>) -> Option<SkillType> {
  SKILL_TYPE_KEYS
    .iter()
    .find_map(|k| obj.get(*k).and_then(Value::as_str))
    .and_then(SkillType::from_explicit)
}

// ---------------------------------------------------------------------------
// Ideal profiles
// ---------------------------------------------------------------------------

/// Target levels taken from an "ideal" skill matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdealProfile {
  by_skill: HashMap<(String, String), u8>,
  by_name: HashMap<String, u8>,
}

impl IdealProfile {
  /// Build from a matrix in any supported shape. An ideal entry's target is its
  /// `competencyLevel` when present, otherwise its `competency`.
  pub fn from_matrix(matrix: &Value) -> Self {
    let mut profile = Self::default();
    let categories = match parse_matrix(matrix) {
      Some(c) => c,
      None => return profile,
    };

    for (category, value) in categories.iter() {
      if is_metadata_category(category) {
        continue;
      }
      for candidate in candidates(category, value) {
        let Some(obj) = candidate.as_object() else {
          continue;
        };
        let Some(name) = usable_name(obj) else {
          continue;
        };
        let level = match read_level(obj, &TARGET_KEYS) {
          LevelField::Level(l) => Some(l),
          _ => match read_level(obj, &COMPETENCY_KEYS) {
            LevelField::Level(l) => Some(l),
            _ => None,
          },
        };
        if let Some(level) = level {
          let name = name.to_ascii_lowercase();
          profile
            .by_skill
            .entry((category.trim().to_ascii_lowercase(), name.clone()))
            .or_insert(level);
          profile.by_name.entry(name).or_insert(level);
        }
      }
    }
    profile
  }

  /// Target for a skill: exact (category, name) match first, then name only.
  pub fn lookup(&self, category: &str, name: &str) -> Option<u8> {
    let name = name.trim().to_ascii_lowercase();
    self
      .by_skill
      .get(&(category.trim().to_ascii_lowercase(), name.clone()))
      .or_else(|| self.by_name.get(&name))
      .copied()
  }

  pub fn len(&self) -> usize {
    self.by_skill.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_skill.is_empty()
  }
}

/// Ideal profiles keyed by department (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct ProfileIndex {
  by_department: HashMap<String, IdealProfile>,
}

impl ProfileIndex {
  pub fn build(profiles: &BTreeMap<String, Value>) -> Self {
    let by_department = profiles
      .iter()
      .map(|(dept, matrix)| (dept.trim().to_ascii_lowercase(), IdealProfile::from_matrix(matrix)))
      .filter(|(_, p)| !p.is_empty())
      .collect();
    Self { by_department }
  }

  pub fn for_department(&self, department: &str) -> Option<&IdealProfile> {
    self.by_department.get(&department.trim().to_ascii_lowercase())
  }
}

/// Where a skill's target comes from when the record omits it:
/// employee profile, then cohort profile, then the default target.
#[derive(Debug, Clone, Copy)]
pub struct TargetContext<'a> {
  default_target: u8,
  employee: Option<&'a IdealProfile>,
  cohort: Option<&'a IdealProfile>,
}

impl<'a> TargetContext<'a> {
  pub fn new(default_target: u8) -> Self {
    Self {
      default_target,
      employee: None,
      cohort: None,
    }
  }

  pub fn with_employee_profile(mut self, profile: Option<&'a IdealProfile>) -> Self {
    self.employee = profile;
    self
  }

  pub fn with_cohort_profile(mut self, profile: Option<&'a IdealProfile>) -> Self {
    self.cohort = profile;
    self
  }

  pub fn default_target(&self) -> u8 {
    self.default_target
  }

  fn resolve(&self, category: &str, name: &str) -> u8 {
    self
      .employee
      .and_then(|p| p.lookup(category, name))
      .or_else(|| self.cohort.and_then(|p| p.lookup(category, name)))
      .unwrap_or(self.default_target)
  }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn placeholder(category: &str) -> SkillRecord {
  SkillRecord {
    name: PLACEHOLDER_SKILL_NAME.to_string(),
    category: category.to_string(),
    competency: 0,
    competency_level: 0,
    skill_type: SkillType::infer_from_category(category),
  }
}

fn normalize_skill(
  category: &str,
  candidate: &Value,
  index: usize,
  ctx: &TargetContext<'_>,
) -> SkillRecord {
  let Some(obj) = candidate.as_object() else {
    warn!(
      category,
      index,
      kind = value_kind(candidate),
      "skill entry is not an object; using placeholder"
    );
    return placeholder(category);
  };
  let Some(name) = usable_name(obj) else {
    warn!(category, index, "skill entry has no usable name; using placeholder");
    return placeholder(category);
  };

  let competency = match read_level(obj, &COMPETENCY_KEYS) {
    LevelField::Level(l) => l,
    LevelField::Missing | LevelField::Unparseable => 0,
  };
  let competency_level = match read_level(obj, &TARGET_KEYS) {
    LevelField::Level(l) => l,
    LevelField::Missing => ctx.resolve(category, name),
    LevelField::Unparseable => ctx.default_target(),
  };
  let skill_type =
    explicit_skill_type(obj).unwrap_or_else(|| SkillType::infer_from_category(category));

  SkillRecord {
    name: name.to_string(),
    category: category.to_string(),
    competency,
    competency_level,
    skill_type,
  }
}

/// Normalize one `(category, value)` pair of a skill matrix.
pub fn normalize_category(
  category: &str,
  value: &Value,
  ctx: &TargetContext<'_>,
) -> Vec<SkillRecord> {
  if is_metadata_category(category) {
    return Vec::new();
  }
  let category = category.trim();
  candidates(category, value)
    .into_iter()
    .enumerate()
    .map(|(index, candidate)| normalize_skill(category, candidate, index, ctx))
    .collect()
}

/// Accept a matrix object, or a JSON string that decodes to one.
fn parse_matrix(matrix: &Value) -> Option<Map<String, Value>> {
  match matrix {
    Value::Object(categories) => Some(categories.clone()),
    Value::Null => None,
    Value::String(s) if s.trim().is_empty() => None,
    Value::String(s) => match serde_json::from_str::<Value>(s) {
      Ok(Value::Object(categories)) => Some(categories),
      _ => {
        warn!("skill matrix string is not a JSON object; no skills extracted");
        None
      }
    },
    other => {
      warn!(
        kind = value_kind(other),
        "skill matrix is not an object; no skills extracted"
      );
      None
    }
  }
}

/// Normalize a whole skill matrix into one flat canonical list.
pub fn normalize_matrix(matrix: &Value, ctx: &TargetContext<'_>) -> Vec<SkillRecord> {
  let Some(categories) = parse_matrix(matrix) else {
    return Vec::new();
  };
  let records: Vec<SkillRecord> = categories
    .iter()
    .flat_map(|(category, value)| normalize_category(category, value, ctx))
    .collect();
  debug!(
    categories = categories.len(),
    skills = records.len(),
    "normalized skill matrix"
  );
  records
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn ctx() -> TargetContext<'static> {
    TargetContext::new(70)
  }

  #[test]
  fn parse_leading_int_variants() {
    assert_eq!(parse_leading_int("85"), Some(85));
    assert_eq!(parse_leading_int(" 40 "), Some(40));
    assert_eq!(parse_leading_int("85%"), Some(85));
    assert_eq!(parse_leading_int("72.6"), Some(72));
    assert_eq!(parse_leading_int("-5"), Some(-5));
    assert_eq!(parse_leading_int("abc"), None);
    assert_eq!(parse_leading_int(""), None);
  }

  #[test]
  fn coerce_level_clamps_and_truncates() {
    assert_eq!(coerce_level(&json!(80)), Some(80));
    assert_eq!(coerce_level(&json!("40")), Some(40));
    assert_eq!(coerce_level(&json!(72.9)), Some(72));
    assert_eq!(coerce_level(&json!(-12)), Some(0));
    assert_eq!(coerce_level(&json!(150)), Some(100));
    assert_eq!(coerce_level(&json!("1e9")), Some(1));
    assert_eq!(coerce_level(&json!(true)), None);
    assert_eq!(coerce_level(&json!("n/a")), None);
  }

  #[test]
  fn list_shape() {
    let value = json!([{"name": "SQL", "competency": 80, "competencyLevel": 70}]);
    let records = normalize_category("technical", &value, &ctx());
    assert_eq!(
      records,
      vec![SkillRecord {
        name: "SQL".into(),
        category: "technical".into(),
        competency: 80,
        competency_level: 70,
        skill_type: SkillType::Technical,
      }]
    );
  }

  #[test]
  fn three_shapes_normalize_identically() {
    let list = json!([{"name": "Go", "competency": 40, "competencyLevel": 75}]);
    let nested = json!({"skills": [{"name": "Go", "competency": "40", "competencyLevel": "75"}]});
    let single = json!({"name": "Go", "competency": 40, "competencyLevel": 75});

    let a = normalize_category("technical", &list, &ctx());
    let b = normalize_category("technical", &nested, &ctx());
    let c = normalize_category("technical", &single, &ctx());
    assert_eq!(a.len(), 1);
    assert_eq!(a, b);
    assert_eq!(a, c);
  }

  #[test]
  fn canonical_list_is_idempotent() {
    let raw = json!([
      {"name": "Rust", "competency": "55", "skill_type": "technical"},
      {"name": "Negotiation", "competency": 90, "competencyLevel": 80, "skillType": "soft_skill"},
      "garbage",
      {"name": "Mystery", "competency": 30, "skill_type": "astrology"}
    ]);
    let first = normalize_category("mixed", &raw, &ctx());
    let canonical = serde_json::to_value(&first).unwrap();
    let second = normalize_category("mixed", &canonical, &ctx());
    assert_eq!(first, second);
  }

  #[test]
  fn metadata_categories_contribute_nothing() {
    let skills = json!([{"name": "Hidden", "competency": 10}]);
    assert!(normalize_category("sop_context", &skills, &ctx()).is_empty());
    assert!(normalize_category("Domain_Knowledge_Context", &skills, &ctx()).is_empty());

    let matrix = json!({
      "sop_context": {"note": "ignore me"},
      "domain_knowledge_context": [{"name": "Also hidden", "competency": 5}],
      "technical": [{"name": "X", "competency": 50}]
    });
    let records = normalize_matrix(&matrix, &ctx());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "X");
    assert_eq!(records[0].competency_level, 70);
  }

  #[test]
  fn malformed_entries_become_placeholders() {
    let value = json!([
      42,
      {"competency": 90},
      {"name": "   "},
      {"name": "Valid", "competency": 65}
    ]);
    let records = normalize_category("technical", &value, &ctx());
    assert_eq!(records.len(), 4);
    for r in &records[..3] {
      assert_eq!(r.name, PLACEHOLDER_SKILL_NAME);
      assert_eq!(r.competency, 0);
      assert_eq!(r.competency_level, 0);
    }
    assert_eq!(records[3].name, "Valid");
    assert_eq!(records[3].competency, 65);
  }

  #[test]
  fn malformed_categories_yield_nothing() {
    assert!(normalize_category("technical", &json!("bare string"), &ctx()).is_empty());
    assert!(normalize_category("technical", &json!(12), &ctx()).is_empty());
    assert!(normalize_category("technical", &json!({"skills": "nope"}), &ctx()).is_empty());
    assert!(normalize_category("technical", &json!(null), &ctx()).is_empty());
  }

  #[test]
  fn unparseable_levels_use_defaults() {
    let value = json!([{"name": "Docker", "competency": "lots", "competencyLevel": "high"}]);
    let records = normalize_category("devops", &value, &ctx());
    assert_eq!(records[0].competency, 0);
    assert_eq!(records[0].competency_level, 70);
  }

  #[test]
  fn field_aliases_accepted() {
    let value = json!([{"name": "K8s", "current_level": "35", "competency_level": 60}]);
    let records = normalize_category("infra", &value, &ctx());
    assert_eq!(records[0].competency, 35);
    assert_eq!(records[0].competency_level, 60);
  }

  #[test]
  fn explicit_skill_type_wins_over_category() {
    let value = json!([
      {"name": "Incident SOP", "competency": 50, "skill_type": "sop"},
      {"name": "Public speaking", "competency": 50}
    ]);
    let records = normalize_category("communication", &value, &ctx());
    assert_eq!(records[0].skill_type, SkillType::Sop);
    assert_eq!(records[1].skill_type, SkillType::SoftSkill);
  }

  #[test]
  fn ideal_profile_precedence() {
    let employee = IdealProfile::from_matrix(&json!({
      "technical": [{"name": "SQL", "competencyLevel": 90}]
    }));
    let cohort = IdealProfile::from_matrix(&json!({
      "technical": {"skills": [{"name": "SQL", "competency": 60}, {"name": "Go", "competency": "80"}]},
      "soft_skills": {"name": "Listening", "competencyLevel": 50}
    }));
    assert_eq!(cohort.len(), 3);

    let ctx = TargetContext::new(70)
      .with_employee_profile(Some(&employee))
      .with_cohort_profile(Some(&cohort));
    let value = json!([
      {"name": "SQL", "competency": 50},
      {"name": "go", "competency": 50},
      {"name": "Rust", "competency": 50},
      {"name": "SQL", "competency": 50, "competencyLevel": 55}
    ]);
    let records = normalize_category("technical", &value, &ctx);
    assert_eq!(records[0].competency_level, 90);
    assert_eq!(records[1].competency_level, 80);
    assert_eq!(records[2].competency_level, 70);
    assert_eq!(records[3].competency_level, 55);

    // Name-only fallback across categories.
    let soft = normalize_category("people", &json!([{"name": "Listening"}]), &ctx);
    assert_eq!(soft[0].competency_level, 50);
  }

  #[test]
  fn profile_index_is_case_insensitive() {
    let mut raw = BTreeMap::new();
    raw.insert(
      "Engineering".to_string(),
      json!({"technical": [{"name": "SQL", "competencyLevel": 85}]}),
    );
    raw.insert("Empty".to_string(), json!("not a matrix"));
    let index = ProfileIndex::build(&raw);
    assert!(index.for_department(" engineering ").is_some());
    assert!(index.for_department("Empty").is_none());
  }

  #[test]
  fn matrix_encoded_as_json_string() {
    let matrix = json!(r#"{"technical": [{"name": "SQL", "competency": 80}]}"#);
    let records = normalize_matrix(&matrix, &ctx());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].competency, 80);

    assert!(normalize_matrix(&json!([1, 2, 3]), &ctx()).is_empty());
    assert!(normalize_matrix(&json!("not json"), &ctx()).is_empty());
    assert!(normalize_matrix(&Value::Null, &ctx()).is_empty());
  }
}
