//! Day-over-day trends for meter readings.

use crate::normalization::percentile::quantile;
use serde::{Deserialize, Serialize};

/// Smallest gap kept between consecutive cut points when deriving them.
const MIN_THRESHOLD_GAP: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Worsening,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeRate {
    Stable,
    Slow,
    Moderate,
    Rapid,
}

/// Cut points on |delta|: below `stable` is stable, below `slow` is slow,
/// below `moderate` is moderate, anything else is rapid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendThresholds {
    pub stable: f64,
    pub slow: f64,
    pub moderate: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self { stable: 5.0, slow: 10.0, moderate: 20.0 }
    }
}

impl TrendThresholds {
    pub fn is_valid(&self) -> bool {
        self.stable > 0.0 && self.stable < self.slow && self.slow < self.moderate
    }

    /// Derive cut points from observed day-over-day deltas.
    ///
    /// stable = median/2, slow = median, moderate = p90, nudged apart so the
    /// sequence is strictly increasing even for degenerate samples.
    pub fn from_deltas(deltas: &[f64]) -> Option<Self> {
        let magnitudes: Vec<f64> = deltas.iter().map(|d| d.abs()).filter(|d| d.is_finite()).collect();
        let median = quantile(&magnitudes, 0.5)?;
        let p90 = quantile(&magnitudes, 0.9)?;

        let stable = (median / 2.0).max(MIN_THRESHOLD_GAP);
        let slow = median.max(stable + MIN_THRESHOLD_GAP);
        let moderate = p90.max(slow + MIN_THRESHOLD_GAP);
        Some(Self { stable, slow, moderate })
    }

    pub fn change_rate(&self, delta: f64) -> ChangeRate {
        let magnitude = delta.abs();
        if magnitude < self.stable {
            ChangeRate::Stable
        } else if magnitude < self.slow {
            ChangeRate::Slow
        } else if magnitude < self.moderate {
            ChangeRate::Moderate
        } else {
            ChangeRate::Rapid
        }
    }

    pub fn direction(&self, delta: f64) -> TrendDirection {
        if delta.abs() < self.stable {
            TrendDirection::Stable
        } else if delta > 0.0 {
            TrendDirection::Improving
        } else {
            TrendDirection::Worsening
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendData {
    pub previous: f64,
    pub delta: f64,
    pub direction: TrendDirection,
    pub change_rate: ChangeRate,
}

pub fn calculate_trend(today: f64, yesterday: f64, thresholds: &TrendThresholds) -> TrendData {
    let delta = today - yesterday;
    TrendData {
        previous: yesterday,
        delta,
        direction: thresholds.direction(delta),
        change_rate: thresholds.change_rate(delta),
    }
}

/// Trends for the three headline numbers of one meter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterTrends {
    pub intensity: TrendData,
    pub harmony: TrendData,
    pub unified_score: TrendData,
}
