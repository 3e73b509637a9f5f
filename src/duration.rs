//! Fractional-hour durations, as entered by coaches (hours + minutes pickers)
//! and stored as a single real number.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// A non-negative number of hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Hours(f64);

impl Hours {
  pub const ZERO: Hours = Hours(0.0);

  /// Coerces negative, NaN and infinite input to zero.
  pub fn new(value: f64) -> Self {
    if value.is_finite() && value > 0.0 {
      Hours(value)
    } else {
      Hours(0.0)
    }
  }

  pub fn from_hm(hours: u32, minutes: u32) -> Self {
    Self::new(hours as f64 + minutes as f64 / 60.0)
  }

  /// Missing values count as zero
  pub fn from_option(value: Option<f64>) -> Self {
    value.map(Self::new).unwrap_or_default()
  }

  pub fn value(self) -> f64 {
    self.0
  }

  /// Split into whole hours and minutes in [0, 60).
  /// Minutes are rounded; a round-up to 60 carries into the hours.
  pub fn decompose(self) -> (u32, u32) {
    let hours = self.0.floor();
    let minutes = ((self.0 - hours) * 60.0).round() as u32;
    if minutes >= 60 {
      (hours as u32 + 1, 0)
    } else {
      (hours as u32, minutes)
    }
  }
}

impl From<f64> for Hours {
  fn from(value: f64) -> Self {
    Self::new(value)
  }
}

impl From<Hours> for f64 {
  fn from(hours: Hours) -> f64 {
    hours.0
  }
}

impl Add for Hours {
  type Output = Hours;

  fn add(self, rhs: Hours) -> Hours {
    Hours(self.0 + rhs.0)
  }
}

impl AddAssign for Hours {
  fn add_assign(&mut self, rhs: Hours) {
    self.0 += rhs.0;
  }
}

impl std::iter::Sum for Hours {
  fn sum<I: Iterator<Item = Hours>>(iter: I) -> Hours {
    iter.fold(Hours::ZERO, |acc, h| acc + h)
  }
}

/// Formats as `1h05`.
impl fmt::Display for Hours {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (h, m) = self.decompose();
    write!(f, "{}h{:02}", h, m)
  }
}
