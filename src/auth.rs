//! Email/password accounts, signed-in sessions and password reset.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{PlannerError, PlannerResult};
use crate::models::{NewAccount, Role, User};
use crate::store::{now_rfc3339, parse_timestamp, users};

const MIN_PASSWORD_LEN: usize = 6;

/// ---------------------------------------------------------------------------
/// Session context
/// ---------------------------------------------------------------------------

/// Who is calling. Passed explicitly to every store operation.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
  token: Option<String>,
  user: Option<User>,
}

impl SessionContext {
  pub fn anonymous() -> Self {
    Self::default()
  }

  pub(crate) fn authenticated(token: Option<String>, user: User) -> Self {
    Self {
      token,
      user: Some(user),
    }
  }

  pub fn current_user_id(&self) -> Option<i64> {
    self.user.as_ref().map(|u| u.id)
  }

  pub fn user(&self) -> Option<&User> {
    self.user.as_ref()
  }

  pub fn role(&self) -> Option<Role> {
    self.user.as_ref().map(|u| u.role)
  }

  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  pub fn require_user(&self) -> PlannerResult<&User> {
    self.user.as_ref().ok_or(PlannerError::NotAuthenticated)
  }
}

/// ---------------------------------------------------------------------------
/// Mail delivery
/// ---------------------------------------------------------------------------

pub trait Mailer: Send + Sync {
  fn send_password_reset(&self, email: &str, token: &str) -> PlannerResult<()>;
}

/// Writes reset links to the log instead of sending mail
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
  fn send_password_reset(&self, email: &str, token: &str) -> PlannerResult<()> {
    tracing::info!(%email, %token, "Password reset requested");
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Accounts
/// ---------------------------------------------------------------------------

fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

fn validate_password(password: &str) -> PlannerResult<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(PlannerError::Validation(format!(
      "Password must be at least {} characters",
      MIN_PASSWORD_LEN
    )));
  }
  Ok(())
}

fn generate_coach_code() -> String {
  Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

/// Create an account. Athletes may enroll with a coach code; an unknown
/// code creates nothing.
pub async fn sign_up(
  pool: &SqlitePool,
  config: &AppConfig,
  account: &NewAccount,
) -> PlannerResult<User> {
  let email = normalize_email(&account.email);
  if email.is_empty() || !email.contains('@') {
    return Err(PlannerError::Validation("A valid email is required".into()));
  }
  validate_password(&account.password)?;

  let code = account
    .coach_code
    .as_deref()
    .map(str::trim)
    .filter(|c| !c.is_empty());

  let (coach_code, coach_id) = match account.role {
    Role::Coach => match code {
      Some(code) => {
        if users::find_coach_by_code(pool, code).await?.is_some() {
          return Err(PlannerError::Validation("coach code already in use".into()));
        }
        (Some(code.to_string()), None)
      }
      None => (Some(generate_coach_code()), None),
    },
    Role::Athlete => match code {
      Some(code) => {
        let coach = users::find_coach_by_code(pool, code)
          .await?
          .ok_or_else(|| PlannerError::Validation("invalid coach code".into()))?;
        (None, Some(coach.id))
      }
      None => (None, None),
    },
  };

  if users::find_credentials(pool, &email).await?.is_some() {
    return Err(PlannerError::Validation("Email is already registered".into()));
  }

  let hash = bcrypt::hash(&account.password, config.bcrypt_cost)?;
  let name = account.name.trim();
  let user = users::insert_user(
    pool,
    &email,
    &hash,
    if name.is_empty() { email.as_str() } else { name },
    account.role,
    coach_code.as_deref(),
    coach_id,
  )
  .await?;

  tracing::info!(user_id = user.id, role = %user.role, "Signed up");
  Ok(user)
}

pub async fn sign_in_with_password(
  pool: &SqlitePool,
  email: &str,
  password: &str,
) -> PlannerResult<SessionContext> {
  let Some((user, hash)) = users::find_credentials(pool, &normalize_email(email)).await? else {
    tracing::info!("Sign-in with unknown email");
    return Err(PlannerError::InvalidCredentials);
  };

  if !bcrypt::verify(password, &hash)? {
    tracing::info!(user_id = user.id, "Sign-in with wrong password");
    return Err(PlannerError::InvalidCredentials);
  }

  let token = Uuid::new_v4().to_string();
  sqlx::query("INSERT INTO auth_sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)")
    .bind(&token)
    .bind(user.id)
    .bind(now_rfc3339())
    .execute(pool)
    .await?;

  tracing::info!(user_id = user.id, "Signed in");
  Ok(SessionContext::authenticated(Some(token), user))
}

/// Revoke the context's token. Signing out twice is fine.
pub async fn sign_out(pool: &SqlitePool, ctx: &SessionContext) -> PlannerResult<()> {
  if let Some(token) = ctx.token() {
    sqlx::query("DELETE FROM auth_sessions WHERE token = ?")
      .bind(token)
      .execute(pool)
      .await?;
    tracing::info!(user_id = ?ctx.current_user_id(), "Signed out");
  }
  Ok(())
}

/// Resolve a session token back to its context
pub async fn current_session(
  pool: &SqlitePool,
  token: &str,
) -> PlannerResult<Option<SessionContext>> {
  let user_id: Option<i64> =
    sqlx::query_scalar("SELECT user_id FROM auth_sessions WHERE token = ?")
      .bind(token)
      .fetch_optional(pool)
      .await?;

  let Some(user_id) = user_id else {
    return Ok(None);
  };

  Ok(
    users::find_by_id(pool, user_id)
      .await?
      .map(|user| SessionContext::authenticated(Some(token.to_string()), user)),
  )
}

/// ---------------------------------------------------------------------------
/// Password reset
/// ---------------------------------------------------------------------------

/// Issue a reset token and hand it to the mailer. Unknown emails succeed
/// without sending anything.
pub async fn send_password_reset_email(
  pool: &SqlitePool,
  config: &AppConfig,
  mailer: &dyn Mailer,
  email: &str,
) -> PlannerResult<()> {
  let email = normalize_email(email);
  let Some((user, _)) = users::find_credentials(pool, &email).await? else {
    tracing::debug!("Password reset for unknown email ignored");
    return Ok(());
  };

  let token = Uuid::new_v4().to_string();
  let expires_at = Duration::try_minutes(config.reset_token_ttl_minutes)
    .and_then(|ttl| Utc::now().checked_add_signed(ttl))
    .ok_or_else(|| {
      PlannerError::Config(format!(
        "RESET_TOKEN_TTL_MINUTES out of range: {}",
        config.reset_token_ttl_minutes
      ))
    })?;

  sqlx::query("INSERT INTO password_resets (token, user_id, expires_at) VALUES (?1, ?2, ?3)")
    .bind(&token)
    .bind(user.id)
    .bind(expires_at.to_rfc3339())
    .execute(pool)
    .await?;

  mailer.send_password_reset(&email, &token)?;
  tracing::info!(user_id = user.id, "Password reset token issued");
  Ok(())
}

/// Set a new password with a reset token. Tokens are single use and expire;
/// existing signed-in sessions for the user are revoked.
pub async fn update_password(
  pool: &SqlitePool,
  config: &AppConfig,
  reset_token: &str,
  new_password: &str,
) -> PlannerResult<()> {
  validate_password(new_password)?;

  let row = sqlx::query(
    "SELECT user_id, expires_at, used_at FROM password_resets WHERE token = ?",
  )
  .bind(reset_token)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| PlannerError::Validation("Invalid reset token".into()))?;

  let user_id: i64 = row.try_get("user_id")?;
  let used_at: Option<String> = row.try_get("used_at")?;
  let expires_at: Option<DateTime<Utc>> = parse_timestamp(row.try_get("expires_at")?);

  if used_at.is_some() {
    return Err(PlannerError::Validation("Reset token already used".into()));
  }
  if expires_at.map_or(true, |at| at <= Utc::now()) {
    return Err(PlannerError::Validation("Reset token expired".into()));
  }

  let hash = bcrypt::hash(new_password, config.bcrypt_cost)?;

  // Claim the token before touching the password so only one reset wins
  let claimed = sqlx::query("UPDATE password_resets SET used_at = ? WHERE token = ? AND used_at IS NULL")
    .bind(now_rfc3339())
    .bind(reset_token)
    .execute(pool)
    .await?;
  if claimed.rows_affected() != 1 {
    return Err(PlannerError::Validation("Reset token already used".into()));
  }

  users::set_password_hash(pool, user_id, &hash).await?;
  sqlx::query("DELETE FROM auth_sessions WHERE user_id = ?")
    .bind(user_id)
    .execute(pool)
    .await?;

  tracing::info!(user_id, "Password updated");
  Ok(())
}
