//! Yearly statistics page for one athlete.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::SessionContext;
use crate::commands::or_empty;
use crate::db::AppState;
use crate::duration::Hours;
use crate::error::{PlannerError, PlannerResult};
use crate::load::collect_events;
use crate::report::{top_n, RankKey};
use crate::store::{absences, authorize_athlete, sessions};
use crate::weeks::{bucket_year, WeekBucket};

const TOP_WEEKS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyStats {
  pub athlete_id: i64,
  pub year: i32,
  /// Weeks with at least one event, for charts
  pub weeks: Vec<WeekBucket>,
  pub top_by_duration: Vec<WeekBucket>,
  pub top_by_sessions: Vec<WeekBucket>,
  pub top_by_load: Vec<WeekBucket>,
  pub total_duration: Hours,
  pub realized_load: f64,
  pub planned_load: f64,
  pub event_count: usize,
  /// Events in the calendar year that belong to a neighbouring ISO year
  pub dropped: usize,
}

/// Events are loaded for the calendar year and bucketed by ISO week, so
/// days around New Year that fall in another ISO year show up in `dropped`.
pub async fn yearly_stats(
  state: &AppState,
  ctx: &SessionContext,
  athlete_id: i64,
  year: i32,
) -> PlannerResult<YearlyStats> {
  authorize_athlete(&state.db, ctx, athlete_id).await?;

  let (first, last) = NaiveDate::from_ymd_opt(year, 1, 1)
    .zip(NaiveDate::from_ymd_opt(year, 12, 31))
    .ok_or_else(|| PlannerError::Validation(format!("Unsupported year {}", year)))?;

  let events = collect_events(
    or_empty(
      sessions::list_range(&state.db, ctx, athlete_id, first, last).await,
      "yearly sessions",
    )?,
    or_empty(
      absences::list_range(&state.db, ctx, athlete_id, first, last).await,
      "yearly absences",
    )?,
  );

  let series = bucket_year(year, &events);
  tracing::debug!(athlete_id, year, events = events.len(), dropped = series.dropped, "Computed yearly stats");

  Ok(YearlyStats {
    athlete_id,
    year,
    weeks: series.non_empty(),
    top_by_duration: top_n(&series.buckets, RankKey::Duration, TOP_WEEKS),
    top_by_sessions: top_n(&series.buckets, RankKey::EventCount, TOP_WEEKS),
    top_by_load: top_n(&series.buckets, RankKey::RealizedLoad, TOP_WEEKS),
    total_duration: series.total_duration(),
    realized_load: series.realized_load(),
    planned_load: series.planned_load(),
    event_count: series.event_count(),
    dropped: series.dropped,
  })
}
