use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::auth::SessionContext;
use crate::duration::Hours;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{AbsenceEvent, AbsenceKind, CompetitionDetails, Effort, NewAbsence};
use crate::store::{authorize_athlete, parse_timestamp};

const ABSENCE_COLUMNS: &str = "id, athlete_id, date, kind, name, distance_km, elevation_gain_m, \
     duration_hours, effort, outcome, comment, created_at";

/// `off` rows ignore any stray competition columns
fn absence_from_row(row: &SqliteRow) -> PlannerResult<AbsenceEvent> {
    let kind: String = row.try_get("kind")?;

    let kind = if kind == "competition" {
        let effort: Option<i64> = row.try_get("effort")?;
        let outcome: String = row.try_get("outcome")?;
        AbsenceKind::Competition(CompetitionDetails {
            name: row.try_get("name")?,
            distance_km: row.try_get("distance_km")?,
            elevation_gain_m: row.try_get("elevation_gain_m")?,
            duration: row.try_get::<Option<f64>, _>("duration_hours")?.map(Hours::new),
            effort: effort.and_then(Effort::new),
            outcome: outcome.parse().unwrap_or_default(),
        })
    } else {
        AbsenceKind::Off
    };

    Ok(AbsenceEvent {
        id: row.try_get("id")?,
        athlete_id: row.try_get("athlete_id")?,
        date: row.try_get("date")?,
        kind,
        comment: row.try_get("comment")?,
        created_at: parse_timestamp(row.try_get("created_at")?),
    })
}

async fn fetch_absence(pool: &SqlitePool, id: i64) -> PlannerResult<AbsenceEvent> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM absences_competitions WHERE id = ?",
        ABSENCE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| PlannerError::NotFound(format!("absence {}", id)))?;
    absence_from_row(&row)
}

pub async fn get_absence(
    pool: &SqlitePool,
    ctx: &SessionContext,
    id: i64,
) -> PlannerResult<AbsenceEvent> {
    let absence = fetch_absence(pool, id).await?;
    authorize_athlete(pool, ctx, absence.athlete_id).await?;
    Ok(absence)
}

/// Absences of one athlete dated within `[start, end]`
pub async fn list_range(
    pool: &SqlitePool,
    ctx: &SessionContext,
    athlete_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> PlannerResult<Vec<AbsenceEvent>> {
    authorize_athlete(pool, ctx, athlete_id).await?;

    let rows = sqlx::query(&format!(
        r#"
        SELECT {} FROM absences_competitions
        WHERE athlete_id = ? AND date >= ? AND date <= ?
        ORDER BY date, id
        "#,
        ABSENCE_COLUMNS
    ))
    .bind(athlete_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    tracing::debug!(athlete_id, %start, %end, count = rows.len(), "Loaded absences");
    rows.iter().map(absence_from_row).collect()
}

/// First competition on or after `from`
pub async fn next_competition(
    pool: &SqlitePool,
    ctx: &SessionContext,
    athlete_id: i64,
    from: NaiveDate,
) -> PlannerResult<Option<AbsenceEvent>> {
    authorize_athlete(pool, ctx, athlete_id).await?;

    let row = sqlx::query(&format!(
        r#"
        SELECT {} FROM absences_competitions
        WHERE athlete_id = ? AND kind = 'competition' AND date >= ?
        ORDER BY date, id
        LIMIT 1
        "#,
        ABSENCE_COLUMNS
    ))
    .bind(athlete_id)
    .bind(from)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(absence_from_row).transpose()
}

fn competition_columns(
    kind: &AbsenceKind,
) -> (Option<String>, Option<f64>, Option<f64>, Option<f64>, Option<i64>, &'static str) {
    match kind {
        AbsenceKind::Off => (None, None, None, None, None, "unset"),
        AbsenceKind::Competition(c) => (
            c.name.clone(),
            c.distance_km,
            c.elevation_gain_m,
            c.duration.map(Hours::value),
            c.effort.map(|e| e.score() as i64),
            c.outcome.as_str(),
        ),
    }
}

pub async fn create_absence(
    pool: &SqlitePool,
    ctx: &SessionContext,
    new: &NewAbsence,
) -> PlannerResult<AbsenceEvent> {
    authorize_athlete(pool, ctx, new.athlete_id).await?;

    let (name, distance, elevation, duration, effort, outcome) = competition_columns(&new.kind);
    let result = sqlx::query(
        r#"
        INSERT INTO absences_competitions
          (athlete_id, date, kind, name, distance_km, elevation_gain_m, duration_hours, effort, outcome, comment)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(new.athlete_id)
    .bind(new.date)
    .bind(new.kind.as_str())
    .bind(name)
    .bind(distance)
    .bind(elevation)
    .bind(duration)
    .bind(effort)
    .bind(outcome)
    .bind(&new.comment)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    tracing::info!(id, athlete_id = new.athlete_id, kind = new.kind.as_str(), "Created absence");
    fetch_absence(pool, id).await
}

/// Replace date, kind, details and comment. The owning athlete is fixed.
pub async fn update_absence(
    pool: &SqlitePool,
    ctx: &SessionContext,
    id: i64,
    update: &NewAbsence,
) -> PlannerResult<AbsenceEvent> {
    let existing = get_absence(pool, ctx, id).await?;
    if existing.athlete_id != update.athlete_id {
        return Err(PlannerError::Validation(
            "an absence cannot change athlete".into(),
        ));
    }

    let (name, distance, elevation, duration, effort, outcome) =
        competition_columns(&update.kind);
    sqlx::query(
        r#"
        UPDATE absences_competitions
        SET date = ?, kind = ?, name = ?, distance_km = ?, elevation_gain_m = ?,
            duration_hours = ?, effort = ?, outcome = ?, comment = ?
        WHERE id = ?
        "#,
    )
    .bind(update.date)
    .bind(update.kind.as_str())
    .bind(name)
    .bind(distance)
    .bind(elevation)
    .bind(duration)
    .bind(effort)
    .bind(outcome)
    .bind(&update.comment)
    .bind(id)
    .execute(pool)
    .await?;

    tracing::info!(id, "Updated absence");
    fetch_absence(pool, id).await
}

pub async fn delete_absence(pool: &SqlitePool, ctx: &SessionContext, id: i64) -> PlannerResult<()> {
    get_absence(pool, ctx, id).await?;

    sqlx::query("DELETE FROM absences_competitions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    tracing::info!(id, "Deleted absence");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RaceOutcome;
    use crate::test_utils::{date, seed_athlete, setup_test_db, teardown_test_db};

    fn race(athlete_id: i64, day: NaiveDate) -> NewAbsence {
        NewAbsence {
            athlete_id,
            date: day,
            kind: AbsenceKind::Competition(CompetitionDetails {
                name: Some("Ultra des Collines".into()),
                distance_km: Some(56.0),
                elevation_gain_m: Some(2400.0),
                duration: Some(Hours::from_hm(7, 30)),
                effort: Effort::new(9),
                outcome: RaceOutcome::Finisher,
            }),
            comment: Some("A race".into()),
        }
    }

    #[tokio::test]
    async fn test_competition_round_trips_through_table() {
        let pool = setup_test_db().await;
        let athlete = seed_athlete(&pool, "ath@example.com", None).await;
        let ctx = SessionContext::authenticated(None, athlete.clone());

        let created = create_absence(&pool, &ctx, &race(athlete.id, date(2025, 5, 18))).await.unwrap();
        let details = created.kind.competition().unwrap();
        assert_eq!(details.name.as_deref(), Some("Ultra des Collines"));
        assert_eq!(details.duration, Some(Hours::new(7.5)));
        assert_eq!(details.effort, Effort::new(9));
        assert_eq!(details.outcome, RaceOutcome::Finisher);

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_off_row_ignores_stray_competition_columns() {
        let pool = setup_test_db().await;
        let athlete = seed_athlete(&pool, "ath@example.com", None).await;
        let ctx = SessionContext::authenticated(None, athlete.clone());

        sqlx::query(
            "INSERT INTO absences_competitions (athlete_id, date, kind, name, duration_hours) VALUES (?, '2025-01-08', 'off', 'leftover', 2.0)",
        )
        .bind(athlete.id)
        .execute(&pool)
        .await
        .unwrap();

        let rows = list_range(&pool, &ctx, athlete.id, date(2025, 1, 6), date(2025, 1, 12)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, AbsenceKind::Off);

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_next_competition_skips_off_days_and_past_races() {
        let pool = setup_test_db().await;
        let athlete = seed_athlete(&pool, "ath@example.com", None).await;
        let ctx = SessionContext::authenticated(None, athlete.clone());

        create_absence(&pool, &ctx, &race(athlete.id, date(2025, 1, 5))).await.unwrap();
        create_absence(
            &pool,
            &ctx,
            &NewAbsence { athlete_id: athlete.id, date: date(2025, 1, 10), kind: AbsenceKind::Off, comment: None },
        )
        .await
        .unwrap();
        let upcoming = create_absence(&pool, &ctx, &race(athlete.id, date(2025, 2, 1))).await.unwrap();

        let next = next_competition(&pool, &ctx, athlete.id, date(2025, 1, 6)).await.unwrap();
        assert_eq!(next.map(|a| a.id), Some(upcoming.id));
        assert!(next_competition(&pool, &ctx, athlete.id, date(2025, 2, 2)).await.unwrap().is_none());

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_update_to_off_clears_details() {
        let pool = setup_test_db().await;
        let athlete = seed_athlete(&pool, "ath@example.com", None).await;
        let ctx = SessionContext::authenticated(None, athlete.clone());

        let created = create_absence(&pool, &ctx, &race(athlete.id, date(2025, 5, 18))).await.unwrap();
        let update = NewAbsence { kind: AbsenceKind::Off, date: date(2025, 5, 19), ..race(athlete.id, date(2025, 5, 18)) };
        let updated = update_absence(&pool, &ctx, created.id, &update).await.unwrap();
        assert_eq!(updated.kind, AbsenceKind::Off);
        assert_eq!(updated.date, date(2025, 5, 19));

        delete_absence(&pool, &ctx, created.id).await.unwrap();
        assert!(matches!(get_absence(&pool, &ctx, created.id).await, Err(PlannerError::NotFound(_))));

        teardown_test_db(pool).await;
    }
}
