//! Small utility helpers used across modules.

/// Countdown formatting: `m:ss` (minutes are not padded).
pub fn format_time(seconds: u64) -> String {
  format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Share of `done` in `total` as 0..=100. Empty totals count as 0%.
pub fn percent(done: usize, total: usize) -> f32 {
  if total == 0 { 0.0 } else { (done as f32 / total as f32) * 100.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn formats_countdown() {
    assert_eq!(format_time(300), "5:00");
    assert_eq!(format_time(59), "0:59");
    assert_eq!(format_time(61), "1:01");
    assert_eq!(format_time(0), "0:00");
  }

  #[test]
  fn percent_handles_empty_total() {
    assert_eq!(percent(0, 0), 0.0);
    assert_eq!(percent(1, 4), 25.0);
  }
}
