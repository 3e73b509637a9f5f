use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::AppConfig;
use crate::error::PlannerResult;

pub type DbPool = SqlitePool;

/// Application state shared by every command
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
}

impl AppState {
  pub async fn connect(config: AppConfig) -> PlannerResult<Self> {
    let db = initialize_db(&config).await?;
    Ok(Self { db, config })
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &AppConfig) -> PlannerResult<DbPool> {
  tracing::info!(url = %config.database_url, "Initializing database");

  let options = SqliteConnectOptions::from_str(&config.database_url)?
    .create_if_missing(true)
    .foreign_keys(true);

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect_with(options)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("Database initialized successfully");

  Ok(pool)
}
