use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::auth::SessionContext;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{Role, User};
use crate::store::parse_timestamp;

const USER_COLUMNS: &str =
    "id, email, name, role, coach_code, coach_id, display_order, created_at";

fn user_from_row(row: &SqliteRow) -> PlannerResult<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: role.parse().map_err(PlannerError::Validation)?,
        coach_code: row.try_get("coach_code")?,
        coach_id: row.try_get("coach_id")?,
        display_order: row.try_get("display_order")?,
        created_at: parse_timestamp(row.try_get("created_at")?),
    })
}

/// Insert a user row. Email uniqueness is enforced by the schema.
pub async fn insert_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    name: &str,
    role: Role,
    coach_code: Option<&str>,
    coach_id: Option<i64>,
) -> PlannerResult<User> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (email, password_hash, name, role, coach_code, coach_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role.to_string())
    .bind(coach_code)
    .bind(coach_id)
    .execute(pool)
    .await?;

    find_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| PlannerError::NotFound("newly created user".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> PlannerResult<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(user_from_row).transpose()
}

/// User plus stored password hash, for sign-in
pub async fn find_credentials(
    pool: &SqlitePool,
    email: &str,
) -> PlannerResult<Option<(User, String)>> {
    let row = sqlx::query(&format!(
        "SELECT {}, password_hash FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let user = user_from_row(&row)?;
            let hash: String = row.try_get("password_hash")?;
            Ok(Some((user, hash)))
        }
        None => Ok(None),
    }
}

pub async fn find_coach_by_code(pool: &SqlitePool, code: &str) -> PlannerResult<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE coach_code = ? AND role = 'coach'",
        USER_COLUMNS
    ))
    .bind(code)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(user_from_row).transpose()
}

pub async fn set_password_hash(pool: &SqlitePool, user_id: i64, hash: &str) -> PlannerResult<()> {
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(hash)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Athletes enrolled with the signed-in coach, in the coach's order
pub async fn list_athletes(pool: &SqlitePool, ctx: &SessionContext) -> PlannerResult<Vec<User>> {
    let coach = ctx.require_user()?;
    if coach.role != Role::Coach {
        return Err(PlannerError::Forbidden("only coaches have athletes".into()));
    }

    let rows = sqlx::query(&format!(
        r#"
        SELECT {} FROM users
        WHERE role = 'athlete' AND coach_id = ?
        ORDER BY display_order IS NULL, display_order, name, id
        "#,
        USER_COLUMNS
    ))
    .bind(coach.id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(user_from_row).collect()
}

/// Swap the athlete at `index` with its neighbour (`direction` -1 or +1)
/// and persist the whole order. Moving past either end is a no-op.
pub async fn reorder_athlete(
    pool: &SqlitePool,
    ctx: &SessionContext,
    index: usize,
    direction: i32,
) -> PlannerResult<Vec<User>> {
    let mut athletes = list_athletes(pool, ctx).await?;

    let target = index as i64 + direction as i64;
    if direction == 0 || index >= athletes.len() || target < 0 || target as usize >= athletes.len()
    {
        return Ok(athletes);
    }
    athletes.swap(index, target as usize);

    for (position, athlete) in athletes.iter_mut().enumerate() {
        athlete.display_order = Some(position as i64);
        sqlx::query("UPDATE users SET display_order = ? WHERE id = ?")
            .bind(position as i64)
            .bind(athlete.id)
            .execute(pool)
            .await?;
    }

    tracing::info!(index, direction, "Reordered athletes");
    Ok(athletes)
}
