use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::duration::Hours;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
  Cycling,
  #[default]
  Run,
  Swim,
  Trail,
  Strength,
  Other,
}

impl Sport {
  pub const ALL: [Sport; 6] = [
    Sport::Cycling,
    Sport::Run,
    Sport::Swim,
    Sport::Trail,
    Sport::Strength,
    Sport::Other,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Sport::Cycling => "cycling",
      Sport::Run => "run",
      Sport::Swim => "swim",
      Sport::Trail => "trail",
      Sport::Strength => "strength",
      Sport::Other => "other",
    }
  }

  /// Lenient parse for stored values; anything unknown is `Other`
  pub fn parse_lenient(s: &str) -> Self {
    s.parse().unwrap_or(Sport::Other)
  }
}

impl fmt::Display for Sport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Sport {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "cycling" | "ride" | "bike" => Ok(Sport::Cycling),
      "run" => Ok(Sport::Run),
      "swim" => Ok(Sport::Swim),
      "trail" => Ok(Sport::Trail),
      "strength" => Ok(Sport::Strength),
      "other" => Ok(Sport::Other),
      _ => Err(format!("Unknown sport: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
  Low,
  #[default]
  Medium,
  High,
}

impl Intensity {
  pub fn as_str(&self) -> &'static str {
    match self {
      Intensity::Low => "low",
      Intensity::Medium => "medium",
      Intensity::High => "high",
    }
  }
}

impl fmt::Display for Intensity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Intensity {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "low" => Ok(Intensity::Low),
      "medium" => Ok(Intensity::Medium),
      "high" => Ok(Intensity::High),
      _ => Err(format!("Unknown intensity: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  #[default]
  Unset,
  Completed,
  NotCompleted,
}

impl SessionStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      SessionStatus::Unset => "unset",
      SessionStatus::Completed => "completed",
      SessionStatus::NotCompleted => "not_completed",
    }
  }
}

impl fmt::Display for SessionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SessionStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "" | "unset" => Ok(SessionStatus::Unset),
      "completed" => Ok(SessionStatus::Completed),
      "not_completed" => Ok(SessionStatus::NotCompleted),
      _ => Err(format!("Unknown session status: {}", s)),
    }
  }
}

/// Perceived effort (RPE), 1 = trivial, 10 = maximal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Effort(u8);

impl Effort {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 10;

  pub fn new(score: i64) -> Option<Self> {
    if (Self::MIN as i64..=Self::MAX as i64).contains(&score) {
      Some(Effort(score as u8))
    } else {
      None
    }
  }

  pub fn score(self) -> u8 {
    self.0
  }

  pub fn as_f64(self) -> f64 {
    self.0 as f64
  }
}

impl TryFrom<u8> for Effort {
  type Error = String;
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Effort::new(value as i64).ok_or_else(|| format!("Effort must be 1-10, got {}", value))
  }
}

impl From<Effort> for u8 {
  fn from(effort: Effort) -> u8 {
    effort.0
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub id: i64,
  pub athlete_id: i64,
  pub date: NaiveDate,
  pub sport: Sport,
  pub title: String,
  pub planned_duration: Hours,
  pub instructions: String,
  pub intensity: Intensity,
  pub status: SessionStatus,
  pub effort: Option<Effort>,
  pub athlete_comment: String,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
  pub fn is_completed(&self) -> bool {
    self.status == SessionStatus::Completed
  }
}

/// For inserting new sessions (without id, status, timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
  pub athlete_id: i64,
  pub date: NaiveDate,
  pub sport: Sport,
  pub title: String,
  pub planned_duration: Hours,
  pub instructions: String,
  pub intensity: Intensity,
}

/// Coach-side edit of the plan fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPlanUpdate {
  pub sport: Sport,
  pub title: String,
  pub planned_duration: Hours,
  pub instructions: String,
  pub intensity: Intensity,
}

/// Athlete-side validation of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLog {
  pub status: SessionStatus,
  pub effort: Option<i64>,
  pub comment: String,
  pub duration: Hours,
}

impl SessionLog {
  /// Effort is only kept for completed sessions and must be 1-10.
  pub fn validated_effort(&self) -> Result<Option<Effort>, String> {
    if self.status != SessionStatus::Completed {
      return Ok(None);
    }
    match self.effort {
      None => Ok(None),
      Some(score) => Effort::new(score)
        .map(Some)
        .ok_or_else(|| format!("Effort must be between 1 and 10, got {}", score)),
    }
  }
}
