//! Reschedule rule: a session may only move onto a day with no absence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{AbsenceEvent, Session};

/// Outcome of a reschedule request. A blocked move is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved,
    Blocked,
    Unchanged,
}

/// True when nothing (off day or competition) occupies the date.
pub fn can_schedule_on(_date: NaiveDate, absences_for_date: &[AbsenceEvent]) -> bool {
    absences_for_date.is_empty()
}

/// Absences of one athlete on one date
pub fn absences_on<'a>(
    absences: &'a [AbsenceEvent],
    athlete_id: i64,
    date: NaiveDate,
) -> Vec<&'a AbsenceEvent> {
    absences
        .iter()
        .filter(|a| a.athlete_id == athlete_id && a.date == date)
        .collect()
}

/// Optimistic in-memory move, applied before the write goes out.
/// Nothing changes unless the outcome is `Moved`.
pub fn apply_move(
    sessions: &mut [Session],
    absences: &[AbsenceEvent],
    session_id: i64,
    dest: NaiveDate,
) -> MoveOutcome {
    let Some(session) = sessions.iter_mut().find(|s| s.id == session_id) else {
        return MoveOutcome::Unchanged;
    };
    if session.date == dest {
        return MoveOutcome::Unchanged;
    }

    let blocking: Vec<AbsenceEvent> = absences_on(absences, session.athlete_id, dest)
        .into_iter()
        .cloned()
        .collect();
    if !can_schedule_on(dest, &blocking) {
        return MoveOutcome::Blocked;
    }

    session.date = dest;
    MoveOutcome::Moved
}
