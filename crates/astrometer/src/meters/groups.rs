//! Life-area groups: the arithmetic mean of their member meters.

use crate::meters::definitions::{MeterGroup, MeterId};
use crate::meters::reading::{AllMetersReading, MeterReading};
use crate::meters::trend::{calculate_trend, TrendData, TrendThresholds};
use crate::normalization::labels::QualityLabel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReading {
    pub group: MeterGroup,
    pub unified_score: f64,
    pub intensity: f64,
    pub harmony: f64,
    pub quality: QualityLabel,
    /// Member furthest from neutral
    pub driver: MeterId,
    pub members: Vec<MeterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendData>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Combine member readings. Returns `None` when no member is present.
///
/// Since the group is a plain mean, members that all sit on one side of 50
/// can never produce a group on the other side.
pub fn aggregate_group(
    group: MeterGroup,
    readings: &[&MeterReading],
    thresholds: &TrendThresholds,
) -> Option<GroupReading> {
    let driver = readings
        .iter()
        .copied()
        .reduce(|best, r| {
            if (r.unified_score - 50.0).abs() > (best.unified_score - 50.0).abs() {
                r
            } else {
                best
            }
        })?
        .meter;

    let unified_score = mean(readings.iter().map(|r| r.unified_score));
    let intensity = mean(readings.iter().map(|r| r.intensity));
    let harmony = mean(readings.iter().map(|r| r.harmony));

    // Only trend the group when every member has yesterday's value
    let previous: Option<Vec<f64>> = readings
        .iter()
        .map(|r| r.trend.map(|t| t.unified_score.previous))
        .collect();
    let trend = previous.map(|prev| calculate_trend(unified_score, mean(prev.into_iter()), thresholds));

    Some(GroupReading {
        group,
        unified_score,
        intensity,
        harmony,
        quality: QualityLabel::from_scores(intensity, harmony),
        driver,
        members: readings.iter().map(|r| r.meter).collect(),
        trend,
    })
}

pub fn calculate_groups(all: &AllMetersReading, thresholds: &TrendThresholds) -> Vec<GroupReading> {
    MeterGroup::ALL
        .into_iter()
        .filter_map(|group| {
            let members: Vec<&MeterReading> = group.members().iter().filter_map(|m| all.meter(*m)).collect();
            aggregate_group(group, &members, thresholds)
        })
        .collect()
}
