use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::auth::SessionContext;
use crate::duration::Hours;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{
    Effort, NewSession, Session, SessionLog, SessionPlanUpdate, SessionStatus, Sport,
};
use crate::schedule::{can_schedule_on, MoveOutcome};
use crate::store::{absences, authorize_athlete, now_rfc3339, parse_timestamp};

/// ----------------------------------------------------------------------------
/// Row mapping
/// ----------------------------------------------------------------------------

const SESSION_COLUMNS: &str = "id, athlete_id, date, sport, title, planned_hours, instructions, \
     intensity, status, effort, athlete_comment, created_at, updated_at";

fn session_from_row(row: &SqliteRow) -> PlannerResult<Session> {
    let sport: String = row.try_get("sport")?;
    let intensity: String = row.try_get("intensity")?;
    let status: String = row.try_get("status")?;
    let effort: Option<i64> = row.try_get("effort")?;

    let status: SessionStatus = status.parse().unwrap_or_default();
    // Effort only survives on completed sessions
    let effort = effort
        .and_then(Effort::new)
        .filter(|_| status == SessionStatus::Completed);

    Ok(Session {
        id: row.try_get("id")?,
        athlete_id: row.try_get("athlete_id")?,
        date: row.try_get("date")?,
        sport: Sport::parse_lenient(&sport),
        title: row.try_get("title")?,
        planned_duration: Hours::new(row.try_get("planned_hours")?),
        instructions: row.try_get("instructions")?,
        intensity: intensity.parse().unwrap_or_default(),
        status,
        effort,
        athlete_comment: row.try_get("athlete_comment")?,
        created_at: parse_timestamp(row.try_get("created_at")?),
        updated_at: parse_timestamp(row.try_get("updated_at")?),
    })
}

async fn fetch_session(pool: &SqlitePool, id: i64) -> PlannerResult<Session> {
    let row = sqlx::query(&format!("SELECT {} FROM sessions WHERE id = ?", SESSION_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PlannerError::NotFound(format!("session {}", id)))?;
    session_from_row(&row)
}

/// ----------------------------------------------------------------------------
/// Reads
/// ----------------------------------------------------------------------------

/// Load one session, checking the caller may access its athlete
pub async fn get_session(
    pool: &SqlitePool,
    ctx: &SessionContext,
    id: i64,
) -> PlannerResult<Session> {
    let session = fetch_session(pool, id).await?;
    authorize_athlete(pool, ctx, session.athlete_id).await?;
    Ok(session)
}

/// Sessions of one athlete dated within `[start, end]`, oldest first
pub async fn list_range(
    pool: &SqlitePool,
    ctx: &SessionContext,
    athlete_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> PlannerResult<Vec<Session>> {
    authorize_athlete(pool, ctx, athlete_id).await?;

    let rows = sqlx::query(&format!(
        r#"
        SELECT {} FROM sessions
        WHERE athlete_id = ? AND date >= ? AND date <= ?
        ORDER BY date, id
        "#,
        SESSION_COLUMNS
    ))
    .bind(athlete_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    tracing::debug!(athlete_id, %start, %end, count = rows.len(), "Loaded sessions");
    rows.iter().map(session_from_row).collect()
}

/// Sessions of several athletes within `[start, end]`. Each athlete is
/// authorized separately.
pub async fn list_for_athletes(
    pool: &SqlitePool,
    ctx: &SessionContext,
    athlete_ids: &[i64],
    start: NaiveDate,
    end: NaiveDate,
) -> PlannerResult<Vec<Session>> {
    let mut all = Vec::new();
    for &athlete_id in athlete_ids {
        all.extend(list_range(pool, ctx, athlete_id, start, end).await?);
    }
    Ok(all)
}

/// ----------------------------------------------------------------------------
/// Writes
/// ----------------------------------------------------------------------------

pub async fn create_session(
    pool: &SqlitePool,
    ctx: &SessionContext,
    new: &NewSession,
) -> PlannerResult<Session> {
    authorize_athlete(pool, ctx, new.athlete_id).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO sessions (athlete_id, date, sport, title, planned_hours, instructions, intensity)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(new.athlete_id)
    .bind(new.date)
    .bind(new.sport.as_str())
    .bind(&new.title)
    .bind(new.planned_duration.value())
    .bind(&new.instructions)
    .bind(new.intensity.as_str())
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    tracing::info!(id, athlete_id = new.athlete_id, date = %new.date, "Created session");
    fetch_session(pool, id).await
}

/// Coach-side edit of sport, title, duration, instructions and intensity
pub async fn update_plan(
    pool: &SqlitePool,
    ctx: &SessionContext,
    id: i64,
    update: &SessionPlanUpdate,
) -> PlannerResult<Session> {
    get_session(pool, ctx, id).await?;

    sqlx::query(
        r#"
        UPDATE sessions
        SET sport = ?, title = ?, planned_hours = ?, instructions = ?, intensity = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(update.sport.as_str())
    .bind(&update.title)
    .bind(update.planned_duration.value())
    .bind(&update.instructions)
    .bind(update.intensity.as_str())
    .bind(now_rfc3339())
    .bind(id)
    .execute(pool)
    .await?;

    tracing::info!(id, "Updated session plan");
    fetch_session(pool, id).await
}

/// Athlete-side validation: status, effort, comment and actual duration.
/// Only the owning athlete may log; a non-completed status clears effort.
pub async fn log_session(
    pool: &SqlitePool,
    ctx: &SessionContext,
    id: i64,
    log: &SessionLog,
) -> PlannerResult<Session> {
    let session = get_session(pool, ctx, id).await?;
    if ctx.current_user_id() != Some(session.athlete_id) {
        return Err(PlannerError::Forbidden(format!(
            "only the athlete can log session {}",
            id
        )));
    }

    let effort = log.validated_effort().map_err(PlannerError::Validation)?;

    sqlx::query(
        r#"
        UPDATE sessions
        SET status = ?, effort = ?, athlete_comment = ?, planned_hours = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(log.status.as_str())
    .bind(effort.map(|e| e.score() as i64))
    .bind(&log.comment)
    .bind(log.duration.value())
    .bind(now_rfc3339())
    .bind(id)
    .execute(pool)
    .await?;

    tracing::info!(id, status = %log.status, "Logged session");
    fetch_session(pool, id).await
}

pub async fn delete_session(pool: &SqlitePool, ctx: &SessionContext, id: i64) -> PlannerResult<()> {
    get_session(pool, ctx, id).await?;

    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    tracing::info!(id, "Deleted session");
    Ok(())
}

/// Move a session to `dest` unless the athlete has an absence that day.
/// A blocked move issues no write.
pub async fn reschedule(
    pool: &SqlitePool,
    ctx: &SessionContext,
    id: i64,
    dest: NaiveDate,
) -> PlannerResult<MoveOutcome> {
    let session = get_session(pool, ctx, id).await?;
    if session.date == dest {
        return Ok(MoveOutcome::Unchanged);
    }

    let blocking = absences::list_range(pool, ctx, session.athlete_id, dest, dest).await?;
    if !can_schedule_on(dest, &blocking) {
        tracing::info!(id, %dest, "Reschedule blocked by absence");
        return Ok(MoveOutcome::Blocked);
    }

    sqlx::query("UPDATE sessions SET date = ?, updated_at = ? WHERE id = ?")
        .bind(dest)
        .bind(now_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;

    tracing::info!(id, from = %session.date, to = %dest, "Rescheduled session");
    Ok(MoveOutcome::Moved)
}
