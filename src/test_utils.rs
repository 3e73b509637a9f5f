//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Seeded coaches and athletes
//! - Mock data factories
//! - Helper assertions

use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::config::AppConfig;
use crate::duration::Hours;
use crate::load::TrainingEvent;
use crate::models::{
  CompetitionDetails, Effort, Intensity, Role, Session, SessionStatus, Sport, User,
};
use crate::store::users;

static NEXT_ID: AtomicI64 = AtomicI64::new(1_000);

fn next_id() -> i64 {
  NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Config with a cheap bcrypt cost so auth tests stay fast
pub fn test_config() -> AppConfig {
  AppConfig {
    database_url: "sqlite::memory:".to_string(),
    max_connections: 1,
    bcrypt_cost: 4,
    ..AppConfig::default()
  }
}

/// Insert a coach with a unique enrollment code
pub async fn seed_coach(pool: &SqlitePool, email: &str) -> User {
  let code = format!("C{}", next_id());
  users::insert_user(pool, email, "not-a-hash", "Coach", Role::Coach, Some(code.as_str()), None)
    .await
    .expect("Failed to seed coach")
}

/// Insert an athlete, optionally enrolled with a coach
pub async fn seed_athlete(pool: &SqlitePool, email: &str, coach_id: Option<i64>) -> User {
  let name = email.split('@').next().unwrap_or(email);
  users::insert_user(pool, email, "not-a-hash", name, Role::Athlete, None, coach_id)
    .await
    .expect("Failed to seed athlete")
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

/// Medium-intensity run for athlete 1 with a unique id
pub fn mock_session(
  day: NaiveDate,
  hours: f64,
  effort: Option<i64>,
  status: SessionStatus,
) -> Session {
  Session {
    id: next_id(),
    athlete_id: 1,
    date: day,
    sport: Sport::Run,
    title: "Easy run".to_string(),
    planned_duration: Hours::new(hours),
    instructions: String::new(),
    intensity: Intensity::Medium,
    status,
    effort: effort.and_then(Effort::new),
    athlete_comment: String::new(),
    created_at: None,
    updated_at: None,
  }
}

/// Competition event for athlete 1
pub fn mock_competition(day: NaiveDate, hours: Option<f64>, effort: Option<i64>) -> TrainingEvent {
  TrainingEvent::Competition {
    id: next_id(),
    athlete_id: 1,
    date: day,
    details: CompetitionDetails {
      name: Some("Local 10k".to_string()),
      duration: hours.map(Hours::new),
      effort: effort.and_then(Effort::new),
      ..Default::default()
    },
  }
}

pub fn mock_athlete(id: i64, name: &str) -> User {
  User {
    id,
    email: format!("{}@example.com", name.to_lowercase()),
    name: name.to_string(),
    role: Role::Athlete,
    coach_code: None,
    coach_id: None,
    display_order: None,
    created_at: None,
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {{
    let (left, right, tolerance) = ($left, $right, $tolerance);
    let diff = (left - right).abs();
    assert!(
      diff < tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      left,
      right,
      diff,
      tolerance
    );
  }};
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<String> = sqlx::query_scalar(
      "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE '_sqlx%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in [
      "absences_competitions",
      "athlete_metrics",
      "auth_sessions",
      "password_resets",
      "sessions",
      "users",
      "weekly_reviews",
    ] {
      assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
    }

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_helpers_link_athlete_to_coach() {
    let pool = setup_test_db().await;
    let coach = seed_coach(&pool, "coach@example.com").await;
    let athlete = seed_athlete(&pool, "jo@example.com", Some(coach.id)).await;

    assert_eq!(coach.role, Role::Coach);
    assert!(coach.coach_code.is_some());
    assert_eq!(athlete.coach_id, Some(coach.id));
    assert_eq!(athlete.name, "jo");

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let a = mock_session(date(2025, 1, 6), 1.0, Some(12), SessionStatus::Completed);
    let b = mock_session(date(2025, 1, 6), 1.0, Some(5), SessionStatus::Completed);
    assert_ne!(a.id, b.id);
    assert_eq!(a.effort, None);
    assert_eq!(b.effort.map(Effort::score), Some(5));

    let race = mock_competition(date(2025, 3, 9), Some(2.0), None);
    assert_eq!(race.athlete_id(), 1);
    assert_eq!(race.duration(), Hours::new(2.0));
  }
}
