//! Coach dashboard: athlete roster, planning and cross-athlete stats.

use serde::{Deserialize, Serialize};

use crate::auth::SessionContext;
use crate::commands::or_empty;
use crate::db::AppState;
use crate::error::{PlannerError, PlannerResult};
use crate::load::collect_events;
use crate::models::{NewSession, Session, SessionPlanUpdate, User};
use crate::report::{comparative_totals, top_n, AthleteTotals, RankKey};
use crate::store::{absences, sessions, users};
use crate::weeks::{bucket_year, iso_year_bounds, WeekBucket};

const TOP_WEEKS: usize = 3;

pub async fn list_athletes(state: &AppState, ctx: &SessionContext) -> PlannerResult<Vec<User>> {
  or_empty(users::list_athletes(&state.db, ctx).await, "athletes")
}

/// Move the athlete at `index` one slot up (-1) or down (+1)
pub async fn reorder_athlete(
  state: &AppState,
  ctx: &SessionContext,
  index: usize,
  direction: i32,
) -> PlannerResult<Vec<User>> {
  users::reorder_athlete(&state.db, ctx, index, direction).await
}

pub async fn plan_session(
  state: &AppState,
  ctx: &SessionContext,
  session: NewSession,
) -> PlannerResult<Session> {
  sessions::create_session(&state.db, ctx, &session).await
}

pub async fn update_session_plan(
  state: &AppState,
  ctx: &SessionContext,
  session_id: i64,
  update: SessionPlanUpdate,
) -> PlannerResult<Session> {
  sessions::update_plan(&state.db, ctx, session_id, &update).await
}

pub async fn delete_session(
  state: &AppState,
  ctx: &SessionContext,
  session_id: i64,
) -> PlannerResult<()> {
  sessions::delete_session(&state.db, ctx, session_id).await
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparativeStats {
  pub year: i32,
  /// Athlete the weekly series is restricted to, or the whole roster
  pub athlete_id: Option<i64>,
  pub athletes: Vec<AthleteTotals>,
  /// Every ISO week of the year
  pub weeks: Vec<WeekBucket>,
  pub top_weeks: Vec<WeekBucket>,
}

/// Totals per athlete over ISO year `year`, biggest volume first, plus the
/// weekly series for the roster or for `athlete_id` alone
pub async fn comparative_stats(
  state: &AppState,
  ctx: &SessionContext,
  year: i32,
  athlete_id: Option<i64>,
) -> PlannerResult<ComparativeStats> {
  let (first, last) = iso_year_bounds(year)
    .ok_or_else(|| PlannerError::Validation(format!("Unsupported year {}", year)))?;

  let athletes = list_athletes(state, ctx).await?;
  let ids: Vec<i64> = athletes.iter().map(|a| a.id).collect();
  if let Some(id) = athlete_id {
    if !ids.contains(&id) {
      return Err(PlannerError::Forbidden(format!("Athlete {} is not on your roster", id)));
    }
  }

  let all_sessions = or_empty(
    sessions::list_for_athletes(&state.db, ctx, &ids, first, last).await,
    "athlete sessions",
  )?;
  let mut all_absences = Vec::new();
  for &athlete_id in &ids {
    all_absences.extend(or_empty(
      absences::list_range(&state.db, ctx, athlete_id, first, last).await,
      "athlete absences",
    )?);
  }

  let events = collect_events(all_sessions, all_absences);
  let series = match athlete_id {
    Some(id) => {
      let selected: Vec<_> = events.iter().filter(|e| e.athlete_id() == id).cloned().collect();
      bucket_year(year, &selected)
    }
    None => bucket_year(year, &events),
  };
  tracing::debug!(year, athletes = ids.len(), events = events.len(), ?athlete_id, "Computed comparative stats");

  Ok(ComparativeStats {
    year,
    athlete_id,
    athletes: comparative_totals(&athletes, &events),
    top_weeks: top_n(&series.buckets, RankKey::Duration, TOP_WEEKS),
    weeks: series.buckets,
  })
}
