use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::auth::SessionContext;
use crate::error::{PlannerError, PlannerResult};
use crate::models::review::valid_stress_score;
use crate::models::WeeklyReview;
use crate::store::{authorize_athlete, now_rfc3339, parse_timestamp};
use crate::weeks::week_start;

fn review_from_row(row: &SqliteRow) -> PlannerResult<WeeklyReview> {
    let score: i64 = row.try_get("stress_score")?;
    Ok(WeeklyReview {
        id: row.try_get("id")?,
        athlete_id: row.try_get("athlete_id")?,
        week_start: row.try_get("week_start")?,
        stress_score: valid_stress_score(score)
            .ok_or_else(|| PlannerError::Validation(format!("stored stress score {}", score)))?,
        comment: row.try_get("comment")?,
        updated_at: parse_timestamp(row.try_get("updated_at")?),
    })
}

/// Insert or replace the review for the ISO week containing `date`
pub async fn upsert_review(
    pool: &SqlitePool,
    ctx: &SessionContext,
    athlete_id: i64,
    date: NaiveDate,
    stress_score: i64,
    comment: &str,
) -> PlannerResult<WeeklyReview> {
    authorize_athlete(pool, ctx, athlete_id).await?;

    let score = valid_stress_score(stress_score).ok_or_else(|| {
        PlannerError::Validation(format!("Stress score must be between 1 and 10, got {}", stress_score))
    })?;
    let monday = week_start(date);

    sqlx::query(
        r#"
        INSERT INTO weekly_reviews (athlete_id, week_start, stress_score, comment, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(athlete_id, week_start) DO UPDATE SET
          stress_score = excluded.stress_score,
          comment = excluded.comment,
          updated_at = excluded.updated_at
        "#,
    )
    .bind(athlete_id)
    .bind(monday)
    .bind(score as i64)
    .bind(comment)
    .bind(now_rfc3339())
    .execute(pool)
    .await?;

    tracing::info!(athlete_id, week_start = %monday, "Saved weekly review");

    get_review(pool, ctx, athlete_id, monday)
        .await?
        .ok_or_else(|| PlannerError::NotFound("weekly review".into()))
}

/// Review for the ISO week containing `date`, if any
pub async fn get_review(
    pool: &SqlitePool,
    ctx: &SessionContext,
    athlete_id: i64,
    date: NaiveDate,
) -> PlannerResult<Option<WeeklyReview>> {
    authorize_athlete(pool, ctx, athlete_id).await?;

    let row = sqlx::query(
        r#"
        SELECT id, athlete_id, week_start, stress_score, comment, updated_at
        FROM weekly_reviews
        WHERE athlete_id = ? AND week_start = ?
        "#,
    )
    .bind(athlete_id)
    .bind(week_start(date))
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(review_from_row).transpose()
}
