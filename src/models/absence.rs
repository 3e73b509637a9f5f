use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::duration::Hours;
use crate::models::session::Effort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceOutcome {
  #[default]
  Unset,
  Finisher,
  DidNotFinish,
}

impl RaceOutcome {
  pub fn as_str(&self) -> &'static str {
    match self {
      RaceOutcome::Unset => "unset",
      RaceOutcome::Finisher => "finisher",
      RaceOutcome::DidNotFinish => "dnf",
    }
  }
}

impl fmt::Display for RaceOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RaceOutcome {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "" | "unset" => Ok(RaceOutcome::Unset),
      "finisher" => Ok(RaceOutcome::Finisher),
      "dnf" => Ok(RaceOutcome::DidNotFinish),
      _ => Err(format!("Unknown race outcome: {}", s)),
    }
  }
}

/// Race details; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitionDetails {
  pub name: Option<String>,
  pub distance_km: Option<f64>,
  pub elevation_gain_m: Option<f64>,
  pub duration: Option<Hours>,
  pub effort: Option<Effort>,
  pub outcome: RaceOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbsenceKind {
  /// Rest / off day
  Off,
  Competition(CompetitionDetails),
}

impl AbsenceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      AbsenceKind::Off => "off",
      AbsenceKind::Competition(_) => "competition",
    }
  }

  pub fn competition(&self) -> Option<&CompetitionDetails> {
    match self {
      AbsenceKind::Off => None,
      AbsenceKind::Competition(details) => Some(details),
    }
  }
}

/// A non-training calendar entry. Any absence blocks rescheduling onto its date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceEvent {
  pub id: i64,
  pub athlete_id: i64,
  pub date: NaiveDate,
  pub kind: AbsenceKind,
  pub comment: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

impl AbsenceEvent {
  pub fn is_competition(&self) -> bool {
    matches!(self.kind, AbsenceKind::Competition(_))
  }
}

/// For inserting or replacing absences (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAbsence {
  pub athlete_id: i64,
  pub date: NaiveDate,
  pub kind: AbsenceKind,
  pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_kind_serializes_tagged() {
    let off = serde_json::to_value(AbsenceKind::Off).unwrap();
    assert_eq!(off["type"], "off");

    let race = AbsenceKind::Competition(CompetitionDetails {
      name: Some("Trail des Cimes".into()),
      distance_km: Some(42.0),
      ..Default::default()
    });
    let json = serde_json::to_value(&race).unwrap();
    assert_eq!(json["type"], "competition");
    assert_eq!(json["name"], "Trail des Cimes");
    assert_eq!(race.competition().and_then(|c| c.distance_km), Some(42.0));
  }

  #[test]
  fn test_outcome_parse() {
    assert_eq!("dnf".parse::<RaceOutcome>().unwrap(), RaceOutcome::DidNotFinish);
    assert_eq!("".parse::<RaceOutcome>().unwrap(), RaceOutcome::Unset);
    assert!("podium".parse::<RaceOutcome>().is_err());
  }
}
