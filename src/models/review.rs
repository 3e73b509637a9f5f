use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Non-training life stress for one ISO week, one per (athlete, week_start)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReview {
  pub id: i64,
  pub athlete_id: i64,
  pub week_start: NaiveDate,
  pub stress_score: u8,
  pub comment: String,
  pub updated_at: Option<DateTime<Utc>>,
}

/// Stress uses the same 1-10 scale as perceived effort
pub fn valid_stress_score(score: i64) -> Option<u8> {
  if (1..=10).contains(&score) {
    Some(score as u8)
  } else {
    None
  }
}
