use serde::Serialize;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Not signed in")]
  NotAuthenticated,

  #[error("Access denied: {0}")]
  Forbidden(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Invalid email or password")]
  InvalidCredentials,

  #[error("Invalid input: {0}")]
  Validation(String),

  #[error("Missing or invalid configuration: {0}")]
  Config(String),

  #[error("Password hashing failed: {0}")]
  PasswordHash(#[from] bcrypt::BcryptError),
}

impl Serialize for PlannerError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
