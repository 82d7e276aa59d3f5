//! Integration tests for the skill gap engine.

use chrono::{DateTime, TimeZone, Utc};
use skill_gap_engine::normalize::{normalize_matrix, TargetContext};
use skill_gap_engine::types::{CohortLevel, RiskLevel, SkillType};
use skill_gap_engine::{cohort, employee, AnalysisRequest, Config, EmployeeInput, Engine};

fn at() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
}

fn employee_from(json: &str) -> EmployeeInput {
  serde_json::from_str(json).unwrap()
}

fn fixture_request() -> AnalysisRequest {
  let json = r#"{
    "employees": [
      {
        "id": "emp-001",
        "name": "Avery Lee",
        "department": "Engineering",
        "team": "Platform",
        "jobTitle": "Backend Engineer",
        "skillMatrix": {
          "technical": [
            {"name": "SQL", "competency": 35, "competencyLevel": 80},
            {"name": "Go", "competency": "72", "competencyLevel": "70"}
          ],
          "communication": {"skills": [{"name": "Technical writing", "competency": 58}]},
          "sop_context": {"note": "interpreted from uploaded SOP"}
        }
      },
      {
        "id": "emp-002",
        "name": "Jordan Diaz",
        "department": "Engineering",
        "team": "Platform",
        "skill_matrix": {
          "technical": {"name": "SQL", "competency": "30%"},
          "domain_knowledge_context": [{"name": "Ignored", "competency": 0}]
        }
      },
      {
        "id": "emp-003",
        "name": "Sam Okafor",
        "department": "Engineering",
        "team": "Apps",
        "skill_matrix": {
          "technical": [{"name": "SQL", "competency": 25}],
          "compliance": [{"name": "Access review", "competency": 20, "skill_type": "sop"}]
        }
      },
      {
        "id": "emp-004",
        "name": "Riley Chen",
        "department": "Operations",
        "team": "Fulfilment",
        "skill_matrix": {
          "domain_knowledge": [{"name": "Customs rules", "competency": 50}],
          "legacy": "corrupted export"
        }
      },
      {
        "id": "emp-005",
        "name": "Morgan Park",
        "department": "Operations",
        "team": "Fulfilment",
        "skill_matrix": null
      }
    ],
    "ideal_profiles": {
      "Operations": {"domain_knowledge": [{"name": "Customs rules", "competencyLevel": 90}]}
    }
  }"#;
  serde_json::from_str(json).unwrap()
}

#[test]
fn scenario_skill_above_target() {
  let e = employee_from(
    r#"{"id": "1", "skill_matrix": {"technical": [{"name": "SQL", "competency": 80, "competencyLevel": 70}]}}"#,
  );
  let s = employee::summarize_employee(&e, None, &Config::default());
  assert_eq!(s.total_skills, 1);
  assert_eq!(s.skills_with_gaps, 0);
  assert_eq!(s.average_competency, 80.0);
}

#[test]
fn scenario_string_encoded_nested_shape() {
  let e = employee_from(
    r#"{"id": "2", "skill_matrix": {"technical": {"skills": [{"name": "Go", "competency": "40", "competencyLevel": "70"}]}}}"#,
  );
  let s = employee::summarize_employee(&e, None, &Config::default());
  assert_eq!(s.skills_with_gaps, 1);
  assert_eq!(s.gaps[0].competency, 40);
  assert_eq!(s.gaps[0].target, 70);
  assert_eq!(s.gaps[0].gap, 30);
}

#[test]
fn scenario_metadata_and_default_target() {
  let e = employee_from(
    r#"{"id": "3", "skill_matrix": {"sop_context": {"note": "ignore me"}, "technical": [{"name": "X", "competency": 50}]}}"#,
  );
  let s = employee::summarize_employee(&e, None, &Config::default());
  assert_eq!(s.total_skills, 1);
  assert_eq!(s.gaps[0].target, 70);
  assert_eq!(s.gaps[0].gap, 20);
}

#[test]
fn scenario_department_average_order_independent() {
  let config = Config::default();
  let a = employee::summarize_employee(
    &employee_from(r#"{"id": "a", "department": "Eng", "skill_matrix": {"technical": [{"name": "SQL", "competency": 60}]}}"#),
    None,
    &config,
  );
  let b = employee::summarize_employee(
    &employee_from(r#"{"id": "b", "department": "Eng", "skill_matrix": {"technical": [{"name": "SQL", "competency": 80}]}}"#),
    None,
    &config,
  );
  let ab = cohort::summarize_cohort(CohortLevel::Department, "Eng", &[a.clone(), b.clone()], &config);
  let ba = cohort::summarize_cohort(CohortLevel::Department, "Eng", &[b, a], &config);
  assert_eq!(ab.avg_competency, 70.0);
  assert_eq!(ab, ba);
}

#[test]
fn scenario_malformed_category_is_skipped() {
  let e = employee_from(
    r#"{"id": "5", "skill_matrix": {"broken": "bare string", "technical": [{"name": "Rust", "competency": 66}]}}"#,
  );
  let s = employee::summarize_employee(&e, None, &Config::default());
  assert_eq!(s.total_skills, 1);
  assert_eq!(s.average_competency, 66.0);
}

#[test]
fn shapes_are_equivalent_end_to_end() {
  let ctx = TargetContext::new(70);
  let list: serde_json::Value =
    serde_json::from_str(r#"{"technical": [{"name": "SQL", "competency": 40}]}"#).unwrap();
  let nested: serde_json::Value =
    serde_json::from_str(r#"{"technical": {"skills": [{"name": "SQL", "competency": "40"}]}}"#).unwrap();
  let single: serde_json::Value =
    serde_json::from_str(r#"{"technical": {"name": "SQL", "competency": 40.0}}"#).unwrap();
  let a = normalize_matrix(&list, &ctx);
  assert_eq!(a, normalize_matrix(&nested, &ctx));
  assert_eq!(a, normalize_matrix(&single, &ctx));
}

#[test]
fn full_report_from_fixture() {
  let engine = Engine::with_defaults();
  let report = engine.analyze(&fixture_request(), at()).unwrap();
  assert!(report.has_data);
  assert_eq!(report.generated_at, "2025-01-15T10:30:00+00:00");

  let o = &report.overview;
  assert_eq!(o.total_employees, 5);
  assert_eq!(o.assessed_employees, 4);
  // emp-001: SQL, Go, Technical writing; emp-002: SQL; emp-003: SQL, Access review;
  // emp-004: Customs rules.
  assert_eq!(o.total_skills, 7);
  assert_eq!(o.department_count, 2);
  assert_eq!(o.team_count, 3);

  // Access review (sop): 70-20 = 50 ranks first among the level-4 gaps.
  assert_eq!(report.high_impact_gaps[0].skill_name, "Access review");

  // SQL gaps: 80-35 = 45, 70-30 = 40, 70-25 = 45 -> avg 43.3, three employees.
  let sql = &report.high_impact_gaps[1];
  assert_eq!(sql.skill_name, "SQL");
  assert_eq!(sql.affected_employee_count, 3);
  assert_eq!(sql.average_gap_percentage, 43.3);
  assert_eq!(sql.max_gap_percentage, 45);
  assert_eq!(sql.risk_level, RiskLevel::High);
  assert!(sql.gap_id.starts_with("gap-"));
  assert!(!sql.recommended_actions.is_empty());

  // Department profile raises the Customs rules target to 90: gap 40 -> level 4.
  let customs = report
    .high_impact_gaps
    .iter()
    .find(|g| g.skill_name == "Customs rules")
    .unwrap();
  assert_eq!(customs.average_gap_percentage, 40.0);
  assert_eq!(customs.risk_level, RiskLevel::High);
  assert_eq!(customs.skill_type, SkillType::DomainKnowledge);

  // Access review is also a compliance risk.
  assert_eq!(report.compliance_risks.len(), 1);
  assert_eq!(report.compliance_risks[0].employee_ids, vec!["emp-003".to_string()]);

  // Sorted by risk then average gap.
  for pair in report.high_impact_gaps.windows(2) {
    assert!(pair[0].risk_level >= pair[1].risk_level);
    if pair[0].risk_level == pair[1].risk_level {
      assert!(pair[0].average_gap_percentage >= pair[1].average_gap_percentage);
    }
  }

  let ops = report
    .departments
    .iter()
    .find(|d| d.name == "Operations")
    .unwrap();
  assert_eq!(ops.employee_count, 2);
  assert_eq!(ops.assessed_employee_count, 1);
  assert_eq!(ops.avg_competency, 50.0);
}

#[test]
fn broad_impact_raises_to_critical() {
  let mut request = fixture_request();
  request.config = Some(Config {
    broad_impact_employees: 2,
    ..Config::default()
  });
  let engine = Engine::new(request.config.clone().unwrap());
  let report = engine.analyze(&request, at()).unwrap();
  assert_eq!(report.high_impact_gaps[0].skill_name, "SQL");
  assert_eq!(report.high_impact_gaps[0].risk_level, RiskLevel::Critical);
}

#[test]
fn employee_order_does_not_change_report() {
  let engine = Engine::with_defaults();
  let request = fixture_request();
  let mut reversed = request.clone();
  reversed.employees.reverse();

  let r1 = engine.analyze(&request, at()).unwrap();
  let r2 = engine.analyze(&reversed, at()).unwrap();
  assert_eq!(r1.overview, r2.overview);
  assert_eq!(r1.organization, r2.organization);
  assert_eq!(r1.departments, r2.departments);
  assert_eq!(r1.teams, r2.teams);
  assert_eq!(r1.high_impact_gaps, r2.high_impact_gaps);
}

#[test]
fn request_with_embedded_config_parses() {
  let json = r#"{
    "employees": [],
    "scope": {"department": "Engineering"},
    "config": {"default_target": 75, "high_impact_limit": 3, "unknown_knob": true}
  }"#;
  // Unknown config fields are ignored.
  let request: AnalysisRequest = serde_json::from_str(json).unwrap();
  let config = request.config.clone().unwrap();
  assert_eq!(config.default_target, 75);
  assert_eq!(config.high_impact_limit, 3);

  let report = Engine::new(config).analyze(&request, at()).unwrap();
  assert!(!report.has_data);
  assert_eq!(report.organization.name, "Engineering");
}

#[test]
fn report_serializes_to_stable_json() {
  let engine = Engine::with_defaults();
  let report = engine.analyze(&fixture_request(), at()).unwrap();
  let value = serde_json::to_value(&report).unwrap();
  assert_eq!(value["has_data"], true);
  assert_eq!(value["high_impact_gaps"][0]["risk_level"], 4);
  assert!(value["critical_gaps"]["technical"].is_array());
  assert!(value["critical_gaps"]["soft_skill"].is_array());
  assert!(value["critical_gaps"]["domain_knowledge"].is_array());
  assert!(value["critical_gaps"]["sop"].is_array());

  let again = serde_json::to_string(&engine.analyze(&fixture_request(), at()).unwrap()).unwrap();
  assert_eq!(serde_json::to_string(&report).unwrap(), again);
}
