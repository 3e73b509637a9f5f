//! Perceived training load: duration (hours) x perceived effort.
//!
//! Realized load only counts what the athlete reported. Planned load fills in
//! a default effort from the session intensity so coaches can preview the
//! week before it is done.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::duration::Hours;
use crate::models::{
  AbsenceEvent, AbsenceKind, CompetitionDetails, Effort, Intensity, Session, SessionStatus, Sport,
};

/// ---------------------------------------------------------------------------
/// Training Events
/// ---------------------------------------------------------------------------

/// Anything that contributes load on a calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainingEvent {
  Session(Session),
  Competition {
    id: i64,
    athlete_id: i64,
    date: NaiveDate,
    details: CompetitionDetails,
  },
}

impl TrainingEvent {
  pub fn date(&self) -> NaiveDate {
    match self {
      TrainingEvent::Session(s) => s.date,
      TrainingEvent::Competition { date, .. } => *date,
    }
  }

  pub fn athlete_id(&self) -> i64 {
    match self {
      TrainingEvent::Session(s) => s.athlete_id,
      TrainingEvent::Competition { athlete_id, .. } => *athlete_id,
    }
  }

  pub fn duration(&self) -> Hours {
    match self {
      TrainingEvent::Session(s) => s.planned_duration,
      TrainingEvent::Competition { details, .. } => details.duration.unwrap_or_default(),
    }
  }

  /// Sport for the per-sport breakdown; competitions have none
  pub fn sport(&self) -> Option<Sport> {
    match self {
      TrainingEvent::Session(s) => Some(s.sport),
      TrainingEvent::Competition { .. } => None,
    }
  }

  pub fn is_completed(&self) -> bool {
    match self {
      TrainingEvent::Session(s) => s.status == SessionStatus::Completed,
      TrainingEvent::Competition { .. } => false,
    }
  }
}

impl From<Session> for TrainingEvent {
  fn from(session: Session) -> Self {
    TrainingEvent::Session(session)
  }
}

impl TrainingEvent {
  /// Off days are not training events
  pub fn from_absence(absence: AbsenceEvent) -> Option<Self> {
    match absence.kind {
      AbsenceKind::Off => None,
      AbsenceKind::Competition(details) => Some(TrainingEvent::Competition {
        id: absence.id,
        athlete_id: absence.athlete_id,
        date: absence.date,
        details,
      }),
    }
  }
}

/// Sessions plus the competitions among the absences, as one event list
pub fn collect_events(sessions: Vec<Session>, absences: Vec<AbsenceEvent>) -> Vec<TrainingEvent> {
  sessions
    .into_iter()
    .map(TrainingEvent::from)
    .chain(absences.into_iter().filter_map(TrainingEvent::from_absence))
    .collect()
}

/// ---------------------------------------------------------------------------
/// Load Calculator
/// ---------------------------------------------------------------------------

/// Effort assumed for a session that has not been rated yet
pub fn default_effort(intensity: Intensity) -> u8 {
  match intensity {
    Intensity::Low => 3,
    Intensity::Medium => 6,
    Intensity::High => 9,
  }
}

/// `hours x effort`; no effort means no load
pub fn load(duration: Hours, effort: Option<Effort>) -> f64 {
  effort.map_or(0.0, |e| duration.value() * e.as_f64())
}

/// Load the athlete actually reported
pub fn realized_load(event: &TrainingEvent) -> f64 {
  match event {
    TrainingEvent::Session(s) => match s.status {
      SessionStatus::Completed => load(s.planned_duration, s.effort),
      SessionStatus::Unset | SessionStatus::NotCompleted => 0.0,
    },
    TrainingEvent::Competition { details, .. } => competition_load(details),
  }
}

/// Expected load: actual effort when rated, otherwise the intensity default
pub fn planned_load(event: &TrainingEvent) -> f64 {
  match event {
    TrainingEvent::Session(s) => {
      let effort = s.effort.map_or(default_effort(s.intensity), Effort::score);
      s.planned_duration.value() * effort as f64
    }
    TrainingEvent::Competition { details, .. } => competition_load(details),
  }
}

fn competition_load(details: &CompetitionDetails) -> f64 {
  match details.duration {
    Some(duration) => load(duration, details.effort),
    None => 0.0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::test_utils::{date, mock_competition, mock_session};

  #[test]
  fn test_load_is_duration_times_effort() {
    for h in [0.0, 0.5, 1.25, 3.0] {
      for e in 1..=10 {
        let l = load(Hours::new(h), Effort::new(e));
        assert_approx_eq!(l, h * e as f64, 1e-12);
      }
      assert_eq!(load(Hours::new(h), None), 0.0);
    }
  }

  #[test]
  fn test_realized_load_requires_completion() {
    let mut s = mock_session(date(2025, 1, 6), 1.5, Some(6), SessionStatus::Completed);
    assert_approx_eq!(realized_load(&s.clone().into()), 9.0, 1e-12);

    s.status = SessionStatus::NotCompleted;
    assert_eq!(realized_load(&s.clone().into()), 0.0);

    s.status = SessionStatus::Completed;
    s.effort = None;
    assert_eq!(realized_load(&s.into()), 0.0);
  }

  #[test]
  fn test_planned_load_uses_intensity_default() {
    let mut s = mock_session(date(2025, 1, 6), 2.0, None, SessionStatus::Unset);
    for (intensity, expected) in [
      (Intensity::Low, 6.0),
      (Intensity::Medium, 12.0),
      (Intensity::High, 18.0),
    ] {
      s.intensity = intensity;
      assert_approx_eq!(planned_load(&s.clone().into()), expected, 1e-12);
    }

    // A rated session plans with its actual effort
    s.effort = Effort::new(4);
    let rated = planned_load(&s.into());
    assert_approx_eq!(rated, 8.0, 1e-12);
  }

  #[test]
  fn test_competition_load() {
    let race = mock_competition(date(2025, 3, 9), Some(4.0), Some(8));
    assert_approx_eq!(realized_load(&race), 32.0, 1e-12);
    assert_approx_eq!(planned_load(&race), 32.0, 1e-12);
    assert_approx_eq!(race.duration().value(), 4.0, 1e-12);
    assert!(race.sport().is_none());

    let no_effort = mock_competition(date(2025, 3, 9), Some(4.0), None);
    assert_eq!(realized_load(&no_effort), 0.0);

    let no_duration = mock_competition(date(2025, 3, 9), None, Some(8));
    assert_eq!(realized_load(&no_duration), 0.0);
  }

  #[test]
  fn test_off_days_are_not_events() {
    let off = AbsenceEvent {
      id: 1,
      athlete_id: 1,
      date: date(2025, 1, 7),
      kind: AbsenceKind::Off,
      comment: None,
      created_at: None,
    };
    assert!(TrainingEvent::from_absence(off).is_none());
  }
}
