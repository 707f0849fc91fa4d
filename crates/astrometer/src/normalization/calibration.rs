//! Calibration dataset: per-meter percentile tables, loaded once and read-only
//! afterwards.

use crate::error::{AstrometerError, Result};
use crate::meters::trend::TrendThresholds;
use crate::normalization::percentile::{quantile, PercentileTable, STANDARD_PERCENTILES};
use crate::scoring::aggregator::{harmony_coefficient, AstrometerScore, DEFAULT_BALLAST};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Raw historical scores kept alongside a table for percentile ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalScores {
    #[serde(default)]
    pub intensity: Vec<f64>,
    #[serde(default)]
    pub harmony: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterCalibration {
    pub intensity: PercentileTable,
    pub harmony: PercentileTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ballast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoricalScores>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalibrationStore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub meters: BTreeMap<String, MeterCalibration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<MeterCalibration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendThresholds>,
}

// Tables arrive as plain maps so a bad breakpoint can be reported against
// its meter instead of as a generic parse error.
#[derive(Debug, Deserialize)]
struct RawMeterCalibration {
    #[serde(alias = "dti_percentiles")]
    intensity: BTreeMap<String, f64>,
    #[serde(alias = "hqs_percentiles")]
    harmony: BTreeMap<String, f64>,
    #[serde(default)]
    ballast: Option<f64>,
    #[serde(default)]
    history: Option<HistoricalScores>,
}

#[derive(Debug, Deserialize)]
struct RawCalibration {
    #[serde(default)]
    version: Option<serde_json::Value>,
    #[serde(default)]
    meters: BTreeMap<String, RawMeterCalibration>,
    #[serde(default)]
    global: Option<RawMeterCalibration>,
    #[serde(default)]
    trend: Option<TrendThresholds>,
}

fn invalid(meter: &str, message: impl Into<String>) -> AstrometerError {
    AstrometerError::InvalidCalibration { meter: meter.to_string(), message: message.into() }
}

impl RawMeterCalibration {
    fn into_calibration(self, meter: &str) -> Result<MeterCalibration> {
        let intensity =
            PercentileTable::try_from(self.intensity).map_err(|e| invalid(meter, format!("intensity: {e}")))?;
        let harmony =
            PercentileTable::try_from(self.harmony).map_err(|e| invalid(meter, format!("harmony: {e}")))?;
        Ok(MeterCalibration { intensity, harmony, ballast: self.ballast, history: self.history })
    }
}

impl MeterCalibration {
    fn validate(&self, meter: &str) -> Result<()> {
        if let Some(ballast) = self.ballast {
            if !ballast.is_finite() || ballast < 0.0 {
                return Err(invalid(meter, format!("ballast {ballast} must be a non-negative number")));
            }
        }
        if let Some(history) = &self.history {
            if history.intensity.iter().chain(&history.harmony).any(|v| !v.is_finite()) {
                return Err(invalid(meter, "history contains non-finite values"));
            }
        }
        if !self.harmony.straddles_zero() {
            warn!("Harmony table for '{meter}' does not straddle zero; neutral anchoring disabled");
        }
        Ok(())
    }
}

impl CalibrationStore {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawCalibration = serde_json::from_str(json)?;

        let mut meters = BTreeMap::new();
        for (name, table) in raw.meters {
            let calibration = table.into_calibration(&name)?;
            meters.insert(name, calibration);
        }
        let global = raw.global.map(|g| g.into_calibration("global")).transpose()?;
        let version = raw.version.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

        let store = Self { version, meters, global, trend: raw.trend };
        store.validate()?;
        Ok(store)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| AstrometerError::CalibrationIo { path: path.to_path_buf(), source })?;
        let store = Self::from_json(&text)?;
        debug!(
            "Loaded calibration from {} ({} meters, global fallback: {})",
            path.display(),
            store.meters.len(),
            store.global.is_some()
        );
        Ok(store)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, calibration) in &self.meters {
            calibration.validate(name)?;
        }
        if let Some(global) = &self.global {
            global.validate("global")?;
        }
        if let Some(trend) = &self.trend {
            if !trend.is_valid() {
                return Err(invalid(
                    "trend",
                    format!(
                        "thresholds must be positive and strictly increasing, got {}/{}/{}",
                        trend.stable, trend.slow, trend.moderate
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Table for a meter, falling back to the global table.
    pub fn table_for(&self, meter: &str) -> Result<&MeterCalibration> {
        self.meters
            .get(meter)
            .or(self.global.as_ref())
            .ok_or_else(|| AstrometerError::MissingCalibration { meter: meter.to_string() })
    }

    pub fn ballast_for(&self, meter: &str, default: f64) -> f64 {
        self.table_for(meter).ok().and_then(|c| c.ballast).unwrap_or(default)
    }

    pub fn trend_thresholds(&self, default: TrendThresholds) -> TrendThresholds {
        self.trend.unwrap_or(default)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .map_err(|source| AstrometerError::CalibrationIo { path: path.to_path_buf(), source })
    }
}

/// Lazily loads a calibration file on first use and shares it afterwards.
///
/// A failed load is returned to the caller and not cached, so the next call
/// retries.
#[derive(Debug)]
pub struct CalibrationCache {
    path: PathBuf,
    store: OnceLock<Arc<CalibrationStore>>,
}

impl CalibrationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), store: OnceLock::new() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.store.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<CalibrationStore>> {
        if let Some(store) = self.store.get() {
            return Ok(Arc::clone(store));
        }
        let loaded = Arc::new(CalibrationStore::load(&self.path)?);
        Ok(Arc::clone(self.store.get_or_init(|| loaded)))
    }
}

#[derive(Debug, Default)]
struct MeterSamples {
    intensity: Vec<f64>,
    harmony_numerator: Vec<f64>,
}

/// Collects raw meter scores and turns them into a `CalibrationStore`.
///
/// Samples are kept as intensity and harmony numerator. The harmony
/// coefficients behind each table are computed only once the meter's ballast
/// is known, so the table describes the same statistic a reading divides out.
#[derive(Debug, Default)]
pub struct CalibrationBuilder {
    samples: BTreeMap<String, MeterSamples>,
    keep_history: bool,
}

fn intensity_table(samples: &[f64]) -> std::result::Result<PercentileTable, String> {
    let mut points = Vec::with_capacity(STANDARD_PERCENTILES.len());
    for pct in STANDARD_PERCENTILES {
        let value = quantile(samples, f64::from(pct) / 100.0).ok_or("no samples")?;
        points.push((f64::from(pct), value));
    }
    PercentileTable::new(points)
}

/// Symmetric harmony table: the magnitude distribution mirrored around zero,
/// with p50 pinned to 0.
fn harmony_table(samples: &[f64]) -> std::result::Result<PercentileTable, String> {
    let magnitudes: Vec<f64> = samples.iter().map(|h| h.abs()).collect();
    let mut points = Vec::with_capacity(STANDARD_PERCENTILES.len());
    for pct in STANDARD_PERCENTILES {
        let offset = f64::from(pct) - 50.0;
        let value = if offset == 0.0 {
            0.0
        } else {
            let magnitude = quantile(&magnitudes, offset.abs() * 2.0 / 100.0).ok_or("no samples")?;
            magnitude.copysign(offset)
        };
        points.push((f64::from(pct), value));
    }
    PercentileTable::new(points)
}

/// Half the median intensity, or the default when that is not positive.
pub fn calibrated_ballast(intensity: &[f64]) -> f64 {
    quantile(intensity, 0.5)
        .map(|median| median / 2.0)
        .filter(|b| *b > 0.0)
        .unwrap_or(DEFAULT_BALLAST)
}

impl CalibrationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the raw samples in each table for percentile ranking.
    pub fn with_history(mut self, keep: bool) -> Self {
        self.keep_history = keep;
        self
    }

    pub fn add_sample(&mut self, meter: &str, intensity: f64, harmony_numerator: f64) {
        if !intensity.is_finite() || !harmony_numerator.is_finite() {
            warn!("Dropping non-finite calibration sample for '{meter}'");
            return;
        }
        let entry = self.samples.entry(meter.to_string()).or_default();
        entry.intensity.push(intensity);
        entry.harmony_numerator.push(harmony_numerator);
    }

    /// Record a raw score computed for `meter`.
    pub fn add_score(&mut self, meter: &str, score: &AstrometerScore) {
        self.add_sample(meter, score.intensity, score.harmony_numerator);
    }

    pub fn sample_count(&self, meter: &str) -> usize {
        self.samples.get(meter).map(|s| s.intensity.len()).unwrap_or(0)
    }

    fn calibrate(&self, name: &str, samples: &MeterSamples) -> Option<MeterCalibration> {
        let intensity_pct = match intensity_table(&samples.intensity) {
            Ok(t) => t,
            Err(e) => {
                warn!("Skipping calibration for '{name}': intensity {e}");
                return None;
            }
        };
        let ballast = calibrated_ballast(&samples.intensity);
        let harmony: Vec<f64> = samples
            .intensity
            .iter()
            .zip(&samples.harmony_numerator)
            .map(|(intensity, numerator)| harmony_coefficient(*numerator, *intensity, ballast))
            .collect();
        let harmony_pct = match harmony_table(&harmony) {
            Ok(t) => t,
            Err(e) => {
                warn!("Skipping calibration for '{name}': harmony {e}");
                return None;
            }
        };
        let history = self.keep_history.then(|| HistoricalScores { intensity: samples.intensity.clone(), harmony });
        Some(MeterCalibration { intensity: intensity_pct, harmony: harmony_pct, ballast: Some(ballast), history })
    }

    /// Build per-meter tables plus a pooled global fallback. Meters whose
    /// samples do not span a range are left to the global table.
    pub fn build(self) -> Result<CalibrationStore> {
        let mut meters = BTreeMap::new();
        let mut pooled = MeterSamples::default();
        for (name, samples) in &self.samples {
            if let Some(calibration) = self.calibrate(name, samples) {
                debug!(
                    "Calibrated '{name}' from {} samples, ballast {:.2}",
                    samples.intensity.len(),
                    calibration.ballast.unwrap_or(DEFAULT_BALLAST)
                );
                meters.insert(name.clone(), calibration);
            }
            pooled.intensity.extend_from_slice(&samples.intensity);
            pooled.harmony_numerator.extend_from_slice(&samples.harmony_numerator);
        }
        let global = self.calibrate("global", &pooled).map(|mut g| {
            g.history = None;
            g
        });

        let store = CalibrationStore { version: Some("1".to_string()), meters, global, trend: None };
        store.validate()?;
        Ok(store)
    }
}
