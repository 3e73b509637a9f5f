use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference values the zone table is derived from, one record per athlete
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthleteMetrics {
  pub athlete_id: i64,
  /// Reference speed in km/h
  pub reference_speed_kmh: Option<f64>,
  /// Reference power in watts
  pub reference_power_w: Option<f64>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// ---------------------------------------------------------------------------
/// Training Zones
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingZone {
  Z1, // Recovery
  Z2, // Endurance
  Z3, // Tempo
  Z4, // Threshold
  Z5, // VO2max
  Z6, // Anaerobic
}

impl TrainingZone {
  pub const ALL: [TrainingZone; 6] = [
    TrainingZone::Z1,
    TrainingZone::Z2,
    TrainingZone::Z3,
    TrainingZone::Z4,
    TrainingZone::Z5,
    TrainingZone::Z6,
  ];

  /// Percent-of-reference band (low, high)
  pub fn band_pct(&self) -> (f64, f64) {
    match self {
      TrainingZone::Z1 => (0.0, 55.0),
      TrainingZone::Z2 => (56.0, 75.0),
      TrainingZone::Z3 => (76.0, 90.0),
      TrainingZone::Z4 => (91.0, 105.0),
      TrainingZone::Z5 => (106.0, 120.0),
      TrainingZone::Z6 => (121.0, 150.0),
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      TrainingZone::Z1 => "Recovery",
      TrainingZone::Z2 => "Endurance",
      TrainingZone::Z3 => "Tempo",
      TrainingZone::Z4 => "Threshold",
      TrainingZone::Z5 => "VO2max",
      TrainingZone::Z6 => "Anaerobic",
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneRow {
  pub zone: TrainingZone,
  pub label: String,
  pub low_pct: f64,
  pub high_pct: f64,
  pub speed_kmh: Option<(f64, f64)>,
  pub power_w: Option<(f64, f64)>,
}

impl AthleteMetrics {
  /// Zone table; speed/power bounds are None when the reference is missing
  pub fn zone_table(&self) -> Vec<ZoneRow> {
    let scale = |reference: Option<f64>, low: f64, high: f64| {
      reference
        .filter(|r| *r > 0.0)
        .map(|r| (round1(r * low / 100.0), round1(r * high / 100.0)))
    };

    TrainingZone::ALL
      .iter()
      .map(|zone| {
        let (low, high) = zone.band_pct();
        ZoneRow {
          zone: *zone,
          label: zone.label().to_string(),
          low_pct: low,
          high_pct: high,
          speed_kmh: scale(self.reference_speed_kmh, low, high),
          power_w: scale(self.reference_power_w, low, high),
        }
      })
      .collect()
  }
}

fn round1(v: f64) -> f64 {
  (v * 10.0).round() / 10.0
}
