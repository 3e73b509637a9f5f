use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Coach,
  Athlete,
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Role::Coach => write!(f, "coach"),
      Role::Athlete => write!(f, "athlete"),
    }
  }
}

impl FromStr for Role {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "coach" => Ok(Role::Coach),
      "athlete" => Ok(Role::Athlete),
      _ => Err(format!("Unknown role: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub email: String,
  pub name: String,
  pub role: Role,
  /// Enrollment code handed out by a coach
  pub coach_code: Option<String>,
  /// Set once at sign-up for athletes
  pub coach_id: Option<i64>,
  /// Coach-defined ordering of athletes
  pub display_order: Option<i64>,
  pub created_at: Option<DateTime<Utc>>,
}

/// Sign-up payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
  pub email: String,
  pub password: String,
  pub name: String,
  pub role: Role,
  /// Coaches: optional custom code. Athletes: the coach to enroll with.
  pub coach_code: Option<String>,
}
