//! Rounding, means and coverage percentages shared by the aggregators.

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

/// Convert a one-decimal value into integer tenths so sums stay exact
/// regardless of summation order.
pub fn to_tenths(value: f64) -> u64 {
  (value * 10.0).round().max(0.0) as u64
}

/// Mean of `count` values whose sum is given in tenths, rounded to one decimal.
pub fn mean_of_tenths(sum_tenths: u64, count: u32) -> f64 {
  if count == 0 {
    0.0
  } else {
    // Round in tenths: 1762 / 4 = 440.5 exactly, where 176.2 / 4 is not.
    (sum_tenths as f64 / f64::from(count)).round() / 10.0
  }
}

/// `(skills - gaps) / skills * 100`, one decimal, 0 when there are no skills.
pub fn coverage_percent(skills: u32, gaps: u32) -> f64 {
  if skills == 0 {
    0.0
  } else {
    round1(skills.saturating_sub(gaps) as f64 / skills as f64 * 100.0)
  }
}
