//! Athlete calendar page: week view, session validation, absences,
//! weekly review and training zones.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::auth::SessionContext;
use crate::commands::or_empty;
use crate::db::AppState;
use crate::error::PlannerResult;
use crate::load::collect_events;
use crate::models::{
  AbsenceEvent, AthleteMetrics, NewAbsence, Session, SessionLog, WeeklyReview, ZoneRow,
};
use crate::report::{RaceCountdown, WeekSummary};
use crate::schedule::{absences_on, can_schedule_on, MoveOutcome};
use crate::store::{absences, authorize_athlete, metrics, reviews, sessions};
use crate::weeks::{bucket_range, days_of_week, week_end, week_start, WeekBucket};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySlot {
  pub date: NaiveDate,
  pub sessions: Vec<Session>,
  pub absences: Vec<AbsenceEvent>,
  /// False when an absence blocks moving sessions here
  pub can_schedule: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekView {
  pub athlete_id: i64,
  pub week_start: NaiveDate,
  pub days: Vec<DaySlot>,
  pub summary: WeekSummary,
  pub previous_week_load: f64,
  pub next_race: Option<AbsenceEvent>,
  pub countdown: RaceCountdown,
  pub bucket: Option<WeekBucket>,
  pub review: Option<WeeklyReview>,
}

/// Everything the week page shows for the ISO week containing `any_date`
pub async fn load_week(
  state: &AppState,
  ctx: &SessionContext,
  athlete_id: i64,
  any_date: NaiveDate,
) -> PlannerResult<WeekView> {
  authorize_athlete(&state.db, ctx, athlete_id).await?;

  let monday = week_start(any_date);
  let sunday = week_end(any_date);
  let prev_monday = monday - Duration::days(7);
  let prev_sunday = monday - Duration::days(1);

  let week_sessions = or_empty(
    sessions::list_range(&state.db, ctx, athlete_id, monday, sunday).await,
    "week sessions",
  )?;
  let week_absences = or_empty(
    absences::list_range(&state.db, ctx, athlete_id, monday, sunday).await,
    "week absences",
  )?;
  let prev_events = collect_events(
    or_empty(
      sessions::list_range(&state.db, ctx, athlete_id, prev_monday, prev_sunday).await,
      "previous week sessions",
    )?,
    or_empty(
      absences::list_range(&state.db, ctx, athlete_id, prev_monday, prev_sunday).await,
      "previous week absences",
    )?,
  );
  let next_race = or_empty(
    absences::next_competition(&state.db, ctx, athlete_id, monday).await,
    "next competition",
  )?;
  let review = or_empty(
    reviews::get_review(&state.db, ctx, athlete_id, monday).await,
    "weekly review",
  )?;

  let days = days_of_week(monday)
    .into_iter()
    .map(|day| {
      let day_absences: Vec<AbsenceEvent> = absences_on(&week_absences, athlete_id, day)
        .into_iter()
        .cloned()
        .collect();
      DaySlot {
        date: day,
        sessions: week_sessions.iter().filter(|s| s.date == day).cloned().collect(),
        can_schedule: can_schedule_on(day, &day_absences),
        absences: day_absences,
      }
    })
    .collect();

  let summary = WeekSummary::compute(&week_sessions);
  let events = collect_events(week_sessions, week_absences);
  let bucket = bucket_range(monday, sunday, &events).buckets.into_iter().next();
  let previous_week_load = bucket_range(prev_monday, prev_sunday, &prev_events).realized_load();
  let countdown = RaceCountdown::between(monday, next_race.as_ref().map(|r| r.date));

  tracing::debug!(athlete_id, week_start = %monday, "Loaded week view");

  Ok(WeekView {
    athlete_id,
    week_start: monday,
    days,
    summary,
    previous_week_load,
    next_race,
    countdown,
    bucket,
    review,
  })
}

/// Athlete validation of one session
pub async fn log_session(
  state: &AppState,
  ctx: &SessionContext,
  session_id: i64,
  log: SessionLog,
) -> PlannerResult<Session> {
  sessions::log_session(&state.db, ctx, session_id, &log).await
}

/// Drag-and-drop move; blocked days are reported, not raised
pub async fn reschedule_session(
  state: &AppState,
  ctx: &SessionContext,
  session_id: i64,
  dest: NaiveDate,
) -> PlannerResult<MoveOutcome> {
  sessions::reschedule(&state.db, ctx, session_id, dest).await
}

/// Create (`id` None) or replace an off day / competition
pub async fn save_absence(
  state: &AppState,
  ctx: &SessionContext,
  id: Option<i64>,
  absence: NewAbsence,
) -> PlannerResult<AbsenceEvent> {
  match id {
    Some(id) => absences::update_absence(&state.db, ctx, id, &absence).await,
    None => absences::create_absence(&state.db, ctx, &absence).await,
  }
}

pub async fn delete_absence(state: &AppState, ctx: &SessionContext, id: i64) -> PlannerResult<()> {
  absences::delete_absence(&state.db, ctx, id).await
}

pub async fn save_weekly_review(
  state: &AppState,
  ctx: &SessionContext,
  athlete_id: i64,
  date: NaiveDate,
  stress_score: i64,
  comment: String,
) -> PlannerResult<WeeklyReview> {
  reviews::upsert_review(&state.db, ctx, athlete_id, date, stress_score, &comment).await
}

pub async fn save_metrics(
  state: &AppState,
  ctx: &SessionContext,
  athlete_id: i64,
  reference_speed_kmh: Option<f64>,
  reference_power_w: Option<f64>,
) -> PlannerResult<AthleteMetrics> {
  metrics::upsert_metrics(&state.db, ctx, athlete_id, reference_speed_kmh, reference_power_w).await
}

/// Zone table for the athlete; bands without bounds when no reference is set
pub async fn training_zones(
  state: &AppState,
  ctx: &SessionContext,
  athlete_id: i64,
) -> PlannerResult<Vec<ZoneRow>> {
  let saved = or_empty(
    metrics::get_metrics(&state.db, ctx, athlete_id).await,
    "athlete metrics",
  )?;
  let metrics = saved.unwrap_or(AthleteMetrics {
    athlete_id,
    ..Default::default()
  });
  Ok(metrics.zone_table())
}
