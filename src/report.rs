//! Summary views over bucketed weeks and flat session lists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::duration::Hours;
use crate::load::{realized_load, TrainingEvent};
use crate::models::{Session, User};
use crate::weeks::{week_start, WeekBucket};

/// ---------------------------------------------------------------------------
/// Top-N Weeks
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankKey {
  Duration,
  RealizedLoad,
  PlannedLoad,
  EventCount,
}

impl RankKey {
  pub fn value(&self, bucket: &WeekBucket) -> f64 {
    match self {
      RankKey::Duration => bucket.total_duration.value(),
      RankKey::RealizedLoad => bucket.realized_load,
      RankKey::PlannedLoad => bucket.planned_load,
      RankKey::EventCount => bucket.event_count as f64,
    }
  }
}

/// The `n` highest weeks by `key`, descending, ties kept in week order.
///
/// Zero-valued weeks never pad the result while any week has a non-zero
/// value; if every week is zero the first `n` weeks are returned.
pub fn top_n(buckets: &[WeekBucket], key: RankKey, n: usize) -> Vec<WeekBucket> {
  let any_non_zero = buckets.iter().any(|b| key.value(b) > 0.0);

  let mut ranked: Vec<&WeekBucket> = buckets
    .iter()
    .filter(|b| !any_non_zero || key.value(b) > 0.0)
    .collect();

  // sort_by is stable, so equal values keep ascending week order
  ranked.sort_by(|a, b| key.value(b).total_cmp(&key.value(a)));
  ranked.into_iter().take(n).cloned().collect()
}

/// ---------------------------------------------------------------------------
/// Progress & Week Summary
/// ---------------------------------------------------------------------------

/// Completed share of sessions as a rounded percentage, 0 for none
pub fn progress_ratio(sessions: &[Session]) -> u8 {
  if sessions.is_empty() {
    return 0;
  }
  let completed = sessions.iter().filter(|s| s.is_completed()).count();
  ((completed as f64 / sessions.len() as f64) * 100.0).round() as u8
}

/// Sidebar recap for one displayed week
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekSummary {
  pub total: usize,
  pub completed: usize,
  pub total_time: Hours,
  pub realized_load: f64,
  pub progress_pct: u8,
}

impl WeekSummary {
  pub fn compute(sessions: &[Session]) -> Self {
    Self {
      total: sessions.len(),
      completed: sessions.iter().filter(|s| s.is_completed()).count(),
      total_time: sessions.iter().map(|s| s.planned_duration).sum(),
      realized_load: realized_session_load(sessions),
      progress_pct: progress_ratio(sessions),
    }
  }
}

/// Realized load of a list of sessions (only completed ones count)
pub fn realized_session_load(sessions: &[Session]) -> f64 {
  sessions
    .iter()
    .map(|s| realized_load(&TrainingEvent::Session(s.clone())))
    .sum()
}

/// ---------------------------------------------------------------------------
/// Cross-Athlete Ranking
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteTotals {
  pub athlete_id: i64,
  pub name: String,
  pub event_count: usize,
  pub total_duration: Hours,
  pub realized_load: f64,
}

/// Per-athlete totals, sorted by duration (desc), then name.
/// Events for athletes not in the list are ignored.
pub fn comparative_totals(athletes: &[User], events: &[TrainingEvent]) -> Vec<AthleteTotals> {
  let mut by_athlete: HashMap<i64, AthleteTotals> = athletes
    .iter()
    .map(|a| {
      (
        a.id,
        AthleteTotals {
          athlete_id: a.id,
          name: a.name.clone(),
          event_count: 0,
          total_duration: Hours::ZERO,
          realized_load: 0.0,
        },
      )
    })
    .collect();

  for event in events {
    if let Some(totals) = by_athlete.get_mut(&event.athlete_id()) {
      totals.event_count += 1;
      totals.total_duration += event.duration();
      totals.realized_load += realized_load(event);
    }
  }

  let mut ranked: Vec<AthleteTotals> = by_athlete.into_values().collect();
  ranked.sort_by(|a, b| {
    b.total_duration
      .value()
      .total_cmp(&a.total_duration.value())
      .then_with(|| a.name.cmp(&b.name))
      .then_with(|| a.athlete_id.cmp(&b.athlete_id))
  });
  ranked
}

/// ---------------------------------------------------------------------------
/// Next Race Countdown
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "weeks", rename_all = "snake_case")]
pub enum RaceCountdown {
  ThisWeek,
  InWeeks(i64),
  NoneUpcoming,
}

impl RaceCountdown {
  /// Weeks are counted from `base`, rounding partial weeks up
  pub fn between(base: NaiveDate, race: Option<NaiveDate>) -> Self {
    let Some(race) = race else {
      return RaceCountdown::NoneUpcoming;
    };
    if week_start(race) == week_start(base) {
      return RaceCountdown::ThisWeek;
    }
    let days = (race - base).num_days();
    if days < 0 {
      return RaceCountdown::NoneUpcoming;
    }
    RaceCountdown::InWeeks((days + 6) / 7)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::models::SessionStatus;
  use crate::test_utils::{date, mock_athlete, mock_competition, mock_session};
  use crate::weeks::bucket_range;

  fn weeks_with_durations(durations: &[f64]) -> Vec<WeekBucket> {
    let events: Vec<TrainingEvent> = durations
      .iter()
      .enumerate()
      .filter(|(_, h)| **h > 0.0)
      .map(|(i, h)| {
        let day = date(2025, 1, 6) + chrono::Duration::days(i as i64 * 7);
        mock_session(day, *h, None, SessionStatus::Unset).into()
      })
      .collect();
    let end = date(2025, 1, 6) + chrono::Duration::days(durations.len() as i64 * 7 - 1);
    bucket_range(date(2025, 1, 6), end, &events).buckets
  }

  #[test]
  fn test_top_n_excludes_zero_weeks() {
    let buckets = weeks_with_durations(&[5.0, 0.0, 3.0]);
    let top = top_n(&buckets, RankKey::Duration, 3);
    let hours: Vec<f64> = top.iter().map(|b| b.total_duration.value()).collect();
    assert_eq!(hours, vec![5.0, 3.0]);
  }

  #[test]
  fn test_top_n_bounded_sorted_and_stable() {
    let buckets = weeks_with_durations(&[2.0, 4.0, 2.0, 1.0, 4.0]);
    let top = top_n(&buckets, RankKey::Duration, 3);
    assert_eq!(top.len(), 3);

    let weeks: Vec<u32> = top.iter().map(|b| b.week).collect();
    // Ties broken by ascending week: W3 before W6, then W2
    assert_eq!(weeks, vec![3, 6, 2]);
    for pair in top.windows(2) {
      assert!(pair[0].total_duration >= pair[1].total_duration);
    }
  }

  #[test]
  fn test_top_n_all_zero_and_empty() {
    let buckets = weeks_with_durations(&[0.0, 0.0, 0.0, 0.0]);
    let top = top_n(&buckets, RankKey::RealizedLoad, 2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].week, 2);

    assert!(top_n(&[], RankKey::Duration, 3).is_empty());
    assert!(top_n(&buckets, RankKey::Duration, 0).is_empty());
  }

  #[test]
  fn test_progress_ratio() {
    assert_eq!(progress_ratio(&[]), 0);

    let d = date(2025, 1, 6);
    let sessions = vec![
      mock_session(d, 1.0, Some(5), SessionStatus::Completed),
      mock_session(d, 1.0, Some(5), SessionStatus::Completed),
      mock_session(d, 1.0, Some(5), SessionStatus::Completed),
      mock_session(d, 1.0, None, SessionStatus::NotCompleted),
    ];
    assert_eq!(progress_ratio(&sessions), 75);
    assert_eq!(progress_ratio(&sessions[..3]), 100);

    // 1 of 3 rounds to 33
    let thirds = vec![
      sessions[0].clone(),
      sessions[3].clone(),
      mock_session(d, 1.0, None, SessionStatus::Unset),
    ];
    assert_eq!(progress_ratio(&thirds), 33);
  }

  #[test]
  fn test_week_summary() {
    let d = date(2025, 1, 6);
    let sessions = vec![
      mock_session(d, 1.5, Some(6), SessionStatus::Completed),
      mock_session(d, 1.0, Some(7), SessionStatus::NotCompleted),
    ];
    let summary = WeekSummary::compute(&sessions);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 1);
    assert_approx_eq!(summary.total_time.value(), 2.5, 1e-12);
    assert_approx_eq!(summary.realized_load, 9.0, 1e-12);
    assert_eq!(summary.progress_pct, 50);

    let empty = WeekSummary::compute(&[]);
    assert_eq!(empty.total, 0);
    assert_eq!(empty.realized_load, 0.0);
  }

  #[test]
  fn test_comparative_totals_sorted_by_duration() {
    let alice = mock_athlete(1, "Alice");
    let bob = mock_athlete(2, "Bob");
    let carl = mock_athlete(3, "Carl");

    let d = date(2025, 5, 5);
    let mut s1 = mock_session(d, 2.0, Some(5), SessionStatus::Completed);
    s1.athlete_id = 1;
    let mut s2 = mock_session(d, 1.0, Some(5), SessionStatus::Completed);
    s2.athlete_id = 2;
    let mut race = mock_competition(d, Some(3.0), Some(8));
    if let TrainingEvent::Competition { athlete_id, .. } = &mut race {
      *athlete_id = 2;
    }
    let mut stranger = mock_session(d, 9.0, None, SessionStatus::Unset);
    stranger.athlete_id = 99;

    let events: Vec<TrainingEvent> = vec![s1.into(), s2.into(), race, stranger.into()];
    let totals = comparative_totals(&[alice, bob, carl], &events);

    let names: Vec<&str> = totals.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "Alice", "Carl"]);
    assert_approx_eq!(totals[0].total_duration.value(), 4.0, 1e-12);
    assert_approx_eq!(totals[0].realized_load, 29.0, 1e-12);
    assert_eq!(totals[0].event_count, 2);
    assert_eq!(totals[2].event_count, 0);

    assert!(comparative_totals(&[], &events).is_empty());
  }

  #[test]
  fn test_race_countdown() {
    let monday = date(2025, 1, 6);
    assert_eq!(RaceCountdown::between(monday, None), RaceCountdown::NoneUpcoming);
    assert_eq!(
      RaceCountdown::between(monday, Some(date(2025, 1, 12))),
      RaceCountdown::ThisWeek
    );
    assert_eq!(
      RaceCountdown::between(monday, Some(date(2025, 1, 13))),
      RaceCountdown::InWeeks(1)
    );
    assert_eq!(
      RaceCountdown::between(monday, Some(date(2025, 1, 16))),
      RaceCountdown::InWeeks(2)
    );
    assert_eq!(
      RaceCountdown::between(monday, Some(date(2025, 2, 3))),
      RaceCountdown::InWeeks(4)
    );
  }
}
