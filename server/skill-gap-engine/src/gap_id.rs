//! Stable identifiers for aggregated skill gaps.

/// Compute a stable id for a skill gap group from its category and skill name.
///
/// Uses blake3 so the same skill maps to the same id across report runs,
/// letting dashboards track a gap over time.
pub fn compute(category: &str, skill_name: &str) -> String {
  let mut hasher = blake3::Hasher::new();
  // Length-prefixed so part boundaries are unambiguous.
  for part in [category, skill_name] {
    hasher.update(&(part.len() as u64).to_le_bytes());
    hasher.update(part.as_bytes());
  }
  let hex = hasher.finalize().to_hex();
  format!("gap-{}", &hex[..16])
}
