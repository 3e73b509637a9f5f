//! ISO week bucketing.
//!
//! Weeks are always ISO-8601: Monday start, numbered 1..=52/53 within an ISO
//! week-year. Series are gap-free so chart axes stay contiguous.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::duration::Hours;
use crate::load::{planned_load, realized_load, TrainingEvent};
use crate::models::Sport;

/// ---------------------------------------------------------------------------
/// Calendar Helpers
/// ---------------------------------------------------------------------------

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
  date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sunday of the ISO week containing `date`
pub fn week_end(date: NaiveDate) -> NaiveDate {
  week_start(date) + Duration::days(6)
}

/// The seven days (Mon..Sun) of the week starting at `monday`
pub fn days_of_week(monday: NaiveDate) -> [NaiveDate; 7] {
  std::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// 52 or 53. December 28th always falls in the last ISO week.
pub fn weeks_in_iso_year(year: i32) -> u32 {
  NaiveDate::from_ymd_opt(year, 12, 28)
    .map(|d| d.iso_week().week())
    .unwrap_or(52)
}

/// First and last day of an ISO week-year, if representable
pub fn iso_year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
  let first = NaiveDate::from_isoywd_opt(year, 1, Weekday::Mon)?;
  let last = first + Duration::days(weeks_in_iso_year(year) as i64 * 7 - 1);
  Some((first, last))
}

/// ---------------------------------------------------------------------------
/// Week Buckets
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekBucket {
  pub iso_year: i32,
  pub week: u32,
  pub week_start: NaiveDate,
  pub event_count: usize,
  pub session_count: usize,
  pub competition_count: usize,
  pub completed_count: usize,
  /// Sessions plus competitions
  pub total_duration: Hours,
  pub realized_load: f64,
  pub planned_load: f64,
  pub sport_durations: BTreeMap<Sport, Hours>,
  pub competition_duration: Hours,
}

impl WeekBucket {
  fn empty(week_start: NaiveDate) -> Self {
    let iso = week_start.iso_week();
    Self {
      iso_year: iso.year(),
      week: iso.week(),
      week_start,
      event_count: 0,
      session_count: 0,
      competition_count: 0,
      completed_count: 0,
      total_duration: Hours::ZERO,
      realized_load: 0.0,
      planned_load: 0.0,
      sport_durations: BTreeMap::new(),
      competition_duration: Hours::ZERO,
    }
  }

  fn add(&mut self, event: &TrainingEvent) {
    let duration = event.duration();

    self.event_count += 1;
    self.total_duration += duration;
    self.realized_load += realized_load(event);
    self.planned_load += planned_load(event);

    match event {
      TrainingEvent::Session(session) => {
        self.session_count += 1;
        if event.is_completed() {
          self.completed_count += 1;
        }
        *self.sport_durations.entry(session.sport).or_default() += duration;
      }
      TrainingEvent::Competition { .. } => {
        self.competition_count += 1;
        self.competition_duration += duration;
      }
    }
  }

  pub fn is_empty(&self) -> bool {
    self.event_count == 0
  }

  pub fn week_end(&self) -> NaiveDate {
    self.week_start + Duration::days(6)
  }
}

/// A contiguous run of weeks plus how many input events fell outside it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekSeries {
  pub buckets: Vec<WeekBucket>,
  pub dropped: usize,
}

impl WeekSeries {
  pub fn event_count(&self) -> usize {
    self.buckets.iter().map(|b| b.event_count).sum()
  }

  pub fn total_duration(&self) -> Hours {
    self.buckets.iter().map(|b| b.total_duration).sum()
  }

  pub fn realized_load(&self) -> f64 {
    self.buckets.iter().map(|b| b.realized_load).sum()
  }

  pub fn planned_load(&self) -> f64 {
    self.buckets.iter().map(|b| b.planned_load).sum()
  }

  pub fn find(&self, iso_year: i32, week: u32) -> Option<&WeekBucket> {
    self.buckets.iter().find(|b| b.iso_year == iso_year && b.week == week)
  }

  /// Only weeks with activity, for chart series
  pub fn non_empty(&self) -> Vec<WeekBucket> {
    self.buckets.iter().filter(|b| !b.is_empty()).cloned().collect()
  }
}

/// Bucket events into every ISO week touching `[start, end]` (inclusive).
/// Events dated outside the range are counted in `dropped`.
pub fn bucket_range(start: NaiveDate, end: NaiveDate, events: &[TrainingEvent]) -> WeekSeries {
  if start > end {
    return WeekSeries {
      buckets: Vec::new(),
      dropped: events.len(),
    };
  }

  let first_monday = week_start(start);
  let week_count = ((week_start(end) - first_monday).num_days() / 7 + 1) as usize;

  let mut buckets: Vec<WeekBucket> = (0..week_count)
    .map(|i| WeekBucket::empty(first_monday + Duration::days(i as i64 * 7)))
    .collect();

  let mut dropped = 0;
  for event in events {
    let date = event.date();
    if date < start || date > end {
      dropped += 1;
      continue;
    }
    let idx = ((week_start(date) - first_monday).num_days() / 7) as usize;
    buckets[idx].add(event);
  }

  WeekSeries { buckets, dropped }
}

/// Bucket events into ISO weeks 1..=52/53 of ISO week-year `year`.
///
/// Dates near New Year can belong to the neighbouring ISO year
/// (2024-12-30 is 2025-W01, 2027-01-01 is 2026-W53); those are dropped.
pub fn bucket_year(year: i32, events: &[TrainingEvent]) -> WeekSeries {
  match iso_year_bounds(year) {
    Some((first, last)) => bucket_range(first, last, events),
    None => WeekSeries {
      buckets: Vec::new(),
      dropped: events.len(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::models::{Intensity, SessionStatus};
  use crate::test_utils::{date, mock_competition, mock_session};

  #[test]
  fn test_week_start_and_end() {
    // 2025-01-08 is a Wednesday
    assert_eq!(week_start(date(2025, 1, 8)), date(2025, 1, 6));
    assert_eq!(week_end(date(2025, 1, 8)), date(2025, 1, 12));
    // Monday and Sunday map to themselves
    assert_eq!(week_start(date(2025, 1, 6)), date(2025, 1, 6));
    assert_eq!(week_end(date(2025, 1, 12)), date(2025, 1, 12));
    // Sunday belongs to the week that started the Monday before
    assert_eq!(week_start(date(2025, 1, 12)), date(2025, 1, 6));
  }

  #[test]
  fn test_weeks_in_iso_year() {
    assert_eq!(weeks_in_iso_year(2025), 52);
    assert_eq!(weeks_in_iso_year(2026), 53);
    assert_eq!(weeks_in_iso_year(2020), 53);
    assert_eq!(weeks_in_iso_year(2024), 52);
  }

  #[test]
  fn test_scenario_week_two_of_2025() {
    let done = mock_session(date(2025, 1, 6), 1.5, Some(6), SessionStatus::Completed);
    let mut open = mock_session(date(2025, 1, 6), 1.0, None, SessionStatus::Unset);
    open.intensity = Intensity::High;
    let events: Vec<TrainingEvent> = vec![done.into(), open.into()];

    let series = bucket_year(2025, &events);
    assert_eq!(series.buckets.len(), 52);
    assert_eq!(series.dropped, 0);

    let week2 = series.find(2025, 2).expect("week 2 present");
    assert_eq!(week2.week_start, date(2025, 1, 6));
    assert_eq!(week2.event_count, 2);
    assert_eq!(week2.completed_count, 1);
    assert_approx_eq!(week2.total_duration.value(), 2.5, 1e-12);
    assert_approx_eq!(week2.realized_load, 9.0, 1e-12);
    // 1.5 x 6 actual + 1.0 x 9 (High default)
    assert_approx_eq!(week2.planned_load, 18.0, 1e-12);
  }

  #[test]
  fn test_range_is_gap_free() {
    let events: Vec<TrainingEvent> = vec![
      mock_session(date(2025, 3, 3), 1.0, None, SessionStatus::Unset).into(),
      mock_session(date(2025, 3, 27), 1.0, None, SessionStatus::Unset).into(),
    ];

    let series = bucket_range(date(2025, 3, 1), date(2025, 3, 31), &events);
    // Weeks starting Feb 24 through Mar 31
    assert_eq!(series.buckets.len(), 6);
    assert_eq!(series.buckets[0].week_start, date(2025, 2, 24));
    assert_eq!(series.buckets[5].week_start, date(2025, 3, 31));
    for pair in series.buckets.windows(2) {
      assert_eq!(pair[1].week_start - pair[0].week_start, Duration::days(7));
    }
    assert_eq!(series.non_empty().len(), 2);
  }

  #[test]
  fn test_event_count_is_conserved_within_year() {
    let mut events: Vec<TrainingEvent> = Vec::new();
    let mut d = date(2025, 1, 1);
    let mut i = 0;
    while d <= date(2025, 12, 28) {
      let status = if i % 3 == 0 {
        SessionStatus::Completed
      } else {
        SessionStatus::Unset
      };
      events.push(mock_session(d, 0.5 + (i % 4) as f64 * 0.25, Some(5), status).into());
      if i % 11 == 0 {
        events.push(mock_competition(d, Some(2.0), Some(7)));
      }
      d += Duration::days(1 + (i % 3) as i64);
      i += 1;
    }

    let series = bucket_range(date(2025, 1, 1), date(2025, 12, 28), &events);
    assert_eq!(series.dropped, 0);
    assert_eq!(series.event_count(), events.len());

    let expected_hours: f64 = events.iter().map(|e| e.duration().value()).sum();
    assert_approx_eq!(series.total_duration().value(), expected_hours, 1e-9);
  }

  #[test]
  fn test_year_boundary_drops_neighbouring_iso_year() {
    // Monday 2024-12-30 is ISO 2025-W01
    let events: Vec<TrainingEvent> =
      vec![mock_session(date(2024, 12, 30), 1.0, Some(5), SessionStatus::Completed).into()];

    let y2024 = bucket_year(2024, &events);
    assert_eq!(y2024.buckets.len(), 52);
    assert_eq!(y2024.dropped, 1);
    assert_eq!(y2024.event_count(), 0);

    let y2025 = bucket_year(2025, &events);
    assert_eq!(y2025.dropped, 0);
    assert_eq!(y2025.buckets[0].week, 1);
    assert_eq!(y2025.buckets[0].event_count, 1);
  }

  #[test]
  fn test_week_53_exists_only_in_long_years() {
    // Friday 2027-01-01 is ISO 2026-W53
    let events: Vec<TrainingEvent> =
      vec![mock_session(date(2027, 1, 1), 1.0, None, SessionStatus::Unset).into()];

    let y2026 = bucket_year(2026, &events);
    assert_eq!(y2026.buckets.len(), 53);
    assert_eq!(y2026.find(2026, 53).map(|b| b.event_count), Some(1));

    let y2027 = bucket_year(2027, &events);
    assert_eq!(y2027.dropped, 1);

    // A range that straddles New Year keeps it
    let straddle = bucket_range(date(2026, 12, 20), date(2027, 1, 10), &events);
    assert_eq!(straddle.dropped, 0);
    assert_eq!(straddle.find(2026, 53).map(|b| b.event_count), Some(1));
  }

  #[test]
  fn test_competitions_count_toward_totals() {
    let events: Vec<TrainingEvent> = vec![
      mock_session(date(2025, 6, 2), 1.0, Some(4), SessionStatus::Completed).into(),
      mock_competition(date(2025, 6, 8), Some(3.0), Some(9)),
    ];

    let series = bucket_range(date(2025, 6, 2), date(2025, 6, 8), &events);
    let week = &series.buckets[0];
    assert_eq!(week.session_count, 1);
    assert_eq!(week.competition_count, 1);
    assert_approx_eq!(week.total_duration.value(), 4.0, 1e-12);
    assert_approx_eq!(week.competition_duration.value(), 3.0, 1e-12);
    assert_approx_eq!(week.realized_load, 31.0, 1e-12);
    assert_eq!(week.sport_durations.get(&Sport::Run), Some(&Hours::new(1.0)));
  }

  #[test]
  fn test_inverted_range_drops_everything() {
    let events: Vec<TrainingEvent> =
      vec![mock_session(date(2025, 1, 6), 1.0, None, SessionStatus::Unset).into()];
    let series = bucket_range(date(2025, 2, 1), date(2025, 1, 1), &events);
    assert!(series.buckets.is_empty());
    assert_eq!(series.dropped, 1);
  }
}
