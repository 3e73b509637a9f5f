//! Table-level persistence. Every call takes the caller's `SessionContext`
//! and is scoped to one athlete the caller may access.

pub mod absences;
pub mod metrics;
pub mod reviews;
pub mod sessions;
pub mod users;

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::SqlitePool;

use crate::auth::SessionContext;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{Role, User};

/// Check that the signed-in user may read/write `athlete_id`'s records:
/// the athlete themselves, or the coach they enrolled with.
pub async fn authorize_athlete(
    pool: &SqlitePool,
    ctx: &SessionContext,
    athlete_id: i64,
) -> PlannerResult<User> {
    let caller = ctx.require_user()?;

    if caller.id == athlete_id && caller.role == Role::Athlete {
        return Ok(caller.clone());
    }

    let athlete = users::find_by_id(pool, athlete_id)
        .await?
        .filter(|u| u.role == Role::Athlete)
        .ok_or_else(|| PlannerError::NotFound(format!("athlete {}", athlete_id)))?;

    if caller.role == Role::Coach && athlete.coach_id == Some(caller.id) {
        Ok(athlete)
    } else {
        tracing::warn!(caller = caller.id, athlete_id, "Denied access to athlete records");
        Err(PlannerError::Forbidden(format!(
            "athlete {} does not belong to user {}",
            athlete_id, caller.id
        )))
    }
}

/// Timestamps are written as RFC 3339; column defaults use SQLite's
/// `CURRENT_TIMESTAMP` format. Accept both.
pub(crate) fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
