//! Runtime configuration read from the environment (and `.env` via dotenvy).

use std::env;

use crate::error::{PlannerError, PlannerResult};

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://coach-planner.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_RESET_TTL_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub database_url: String,
  pub max_connections: u32,
  pub log_filter: String,
  pub bcrypt_cost: u32,
  pub reset_token_ttl_minutes: i64,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      max_connections: DEFAULT_MAX_CONNECTIONS,
      log_filter: DEFAULT_LOG_FILTER.to_string(),
      bcrypt_cost: bcrypt::DEFAULT_COST,
      reset_token_ttl_minutes: DEFAULT_RESET_TTL_MINUTES,
    }
  }
}

impl AppConfig {
  /// Build config from environment variables, falling back to defaults
  /// for anything unset. Set-but-unparseable numbers are an error.
  pub fn from_env() -> PlannerResult<Self> {
    let defaults = Self::default();

    Ok(Self {
      database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
      max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.max_connections)?,
      log_filter: env::var("LOG_FILTER").unwrap_or(defaults.log_filter),
      bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
      reset_token_ttl_minutes: parse_var(
        "RESET_TOKEN_TTL_MINUTES",
        defaults.reset_token_ttl_minutes,
      )?,
    })
  }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> PlannerResult<T> {
  match env::var(name) {
    Ok(raw) => raw
      .trim()
      .parse()
      .map_err(|_| PlannerError::Config(format!("{} has invalid value '{}'", name, raw))),
    Err(_) => Ok(default),
  }
}
