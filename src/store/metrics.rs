use sqlx::{Row, SqlitePool};

use crate::auth::SessionContext;
use crate::error::{PlannerError, PlannerResult};
use crate::models::AthleteMetrics;
use crate::store::{authorize_athlete, now_rfc3339, parse_timestamp};

fn positive(value: Option<f64>, field: &str) -> PlannerResult<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(PlannerError::Validation(format!(
            "{} must be a positive number",
            field
        ))),
        other => Ok(other),
    }
}

pub async fn upsert_metrics(
    pool: &SqlitePool,
    ctx: &SessionContext,
    athlete_id: i64,
    reference_speed_kmh: Option<f64>,
    reference_power_w: Option<f64>,
) -> PlannerResult<AthleteMetrics> {
    authorize_athlete(pool, ctx, athlete_id).await?;

    let speed = positive(reference_speed_kmh, "reference speed")?;
    let power = positive(reference_power_w, "reference power")?;

    sqlx::query(
        r#"
        INSERT INTO athlete_metrics (athlete_id, reference_speed_kmh, reference_power_w, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(athlete_id) DO UPDATE SET
          reference_speed_kmh = excluded.reference_speed_kmh,
          reference_power_w = excluded.reference_power_w,
          updated_at = excluded.updated_at
        "#,
    )
    .bind(athlete_id)
    .bind(speed)
    .bind(power)
    .bind(now_rfc3339())
    .execute(pool)
    .await?;

    tracing::info!(athlete_id, "Saved athlete metrics");

    get_metrics(pool, ctx, athlete_id)
        .await?
        .ok_or_else(|| PlannerError::NotFound(format!("metrics for athlete {}", athlete_id)))
}

pub async fn get_metrics(
    pool: &SqlitePool,
    ctx: &SessionContext,
    athlete_id: i64,
) -> PlannerResult<Option<AthleteMetrics>> {
    authorize_athlete(pool, ctx, athlete_id).await?;

    let row = sqlx::query(
        r#"
        SELECT athlete_id, reference_speed_kmh, reference_power_w, updated_at
        FROM athlete_metrics
        WHERE athlete_id = ?
        "#,
    )
    .bind(athlete_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(AthleteMetrics {
            athlete_id: row.try_get("athlete_id")?,
            reference_speed_kmh: row.try_get("reference_speed_kmh")?,
            reference_power_w: row.try_get("reference_power_w")?,
            updated_at: parse_timestamp(row.try_get("updated_at")?),
        })),
        None => Ok(None),
    }
}
