pub mod calibration;
pub mod labels;
pub mod percentile;

pub use calibration::{CalibrationBuilder, CalibrationCache, CalibrationStore, HistoricalScores, MeterCalibration};
pub use labels::{HarmonyLabel, IntensityLabel, QualityLabel};
pub use percentile::{interpolate_percentile, normalize_harmony, percentile_rank, PercentileTable};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    #[default]
    Percentile,
    Sigmoid,
}

/// Raw intensity onto 0-100.
pub fn normalize_intensity(raw: f64, calibration: &MeterCalibration, mode: NormalizationMode) -> f64 {
    let table = &calibration.intensity;
    match mode {
        NormalizationMode::Percentile => interpolate_percentile(raw, table),
        NormalizationMode::Sigmoid => percentile::sigmoid_normalize(raw, table.value_at(50.0), table),
    }
}

/// Raw harmony coefficient onto 0-100 with 0 pinned to 50.
pub fn normalize_harmony_score(raw: f64, calibration: &MeterCalibration, mode: NormalizationMode) -> f64 {
    let table = &calibration.harmony;
    match mode {
        NormalizationMode::Percentile => normalize_harmony(raw, table),
        // Centred on zero rather than the median to keep the neutral point
        NormalizationMode::Sigmoid => percentile::sigmoid_normalize(raw, 0.0, table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibration() -> MeterCalibration {
        MeterCalibration {
            intensity: PercentileTable::from_keys([("p01", 0.0), ("p25", 10.0), ("p50", 20.0), ("p75", 30.0), ("p99", 60.0)])
                .unwrap(),
            harmony: PercentileTable::from_keys([("p01", -0.6), ("p50", 0.1), ("p99", 0.9)]).unwrap(),
            ballast: None,
            history: None,
        }
    }

    #[test]
    fn test_neutral_harmony_in_both_modes() {
        let cal = calibration();
        assert_eq!(normalize_harmony_score(0.0, &cal, NormalizationMode::Percentile), 50.0);
        assert!((normalize_harmony_score(0.0, &cal, NormalizationMode::Sigmoid) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_intensity_modes_agree_on_median() {
        let cal = calibration();
        let pct = normalize_intensity(20.0, &cal, NormalizationMode::Percentile);
        let sig = normalize_intensity(20.0, &cal, NormalizationMode::Sigmoid);
        assert!((sig - 50.0).abs() < 1e-9);
        assert!(pct > 45.0 && pct < 55.0);
    }
}
