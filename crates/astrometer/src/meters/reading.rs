//! Meter pipeline: aspects in, calibrated readings out.

use crate::aspects::calculator::AspectCalculator;
use crate::aspects::types::TransitAspect;
use crate::ephemeris::types::ChartData;
use crate::error::Result;
use crate::meters::definitions::{MeterGroup, MeterId};
use crate::meters::interpretation::{advice, interpret};
use crate::meters::trend::{calculate_trend, MeterTrends, TrendThresholds};
use crate::normalization::calibration::CalibrationStore;
use crate::normalization::labels::{IntensityLabel, QualityLabel};
use crate::normalization::percentile::percentile_rank;
use crate::normalization::{normalize_harmony_score, normalize_intensity};
use crate::scoring::aggregator::{aggregate, AstrometerScore};
use crate::scoring::background::CosmicBackground;
use crate::scoring::contribution::{build_contributions, AspectContribution};
use crate::settings::EngineSettings;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Share of the polarity that survives at zero intensity.
pub const UNIFIED_POLARITY_FLOOR: f64 = 0.3;
pub const UNIFIED_SIGMOID_SCALE: f64 = 15.0;

/// Single 0-100 number from normalized intensity and harmony.
///
/// Harmony sets the direction, intensity how far it moves; 50 is neutral.
pub fn unified_score(intensity: f64, harmony: f64, dither: f64) -> f64 {
    let polarity = (harmony - 50.0) / 50.0;
    let magnitude = intensity / 100.0;
    let raw = 50.0 * polarity * (UNIFIED_POLARITY_FLOOR + (1.0 - UNIFIED_POLARITY_FLOOR) * magnitude) + dither;
    (100.0 / (1.0 + (-raw / UNIFIED_SIGMOID_SCALE).exp())).clamp(0.0, 100.0)
}

/// Tightest aspects first; equal orbs go to the stronger one.
pub fn top_aspects(contributions: &[AspectContribution], limit: usize) -> Vec<AspectContribution> {
    let mut sorted = contributions.to_vec();
    sorted.sort_by(|a, b| {
        a.orb_deviation
            .total_cmp(&b.orb_deviation)
            .then_with(|| b.gaussian_power.total_cmp(&a.gaussian_power))
    });
    sorted.truncate(limit);
    sorted
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawScores {
    pub dti: f64,
    pub hqs: f64,
    pub intensity: f64,
    pub harmony_coefficient: f64,
    pub ballast: f64,
}

impl From<&AstrometerScore> for RawScores {
    fn from(score: &AstrometerScore) -> Self {
        Self {
            dti: score.dti,
            hqs: score.hqs,
            intensity: score.intensity,
            harmony_coefficient: score.harmony_coefficient,
            ballast: score.ballast,
        }
    }
}

/// Where today's raw values sit in the calibration history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRank {
    pub intensity: f64,
    pub harmony: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub meter: MeterId,
    pub group: Option<MeterGroup>,
    pub date: NaiveDate,
    pub unified_score: f64,
    pub intensity: f64,
    pub harmony: f64,
    pub quality: QualityLabel,
    pub state: IntensityLabel,
    pub interpretation: String,
    pub advice: Vec<String>,
    pub top_aspects: Vec<AspectContribution>,
    pub raw_scores: RawScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_rank: Option<HistoricalRank>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<MeterTrends>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllMetersReading {
    pub date: NaiveDate,
    pub aspect_count: usize,
    pub meters: BTreeMap<MeterId, MeterReading>,
}

impl AllMetersReading {
    pub fn meter(&self, meter: MeterId) -> Option<&MeterReading> {
        self.meters.get(&meter)
    }
}

/// Inputs shared by every meter for one natal chart on one day.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub aspects: Vec<TransitAspect>,
    pub chart_hash: u64,
    pub date: NaiveDate,
    pub settings: &'a EngineSettings,
}

impl<'a> ScoringContext<'a> {
    pub fn new(natal: &ChartData, transit: &ChartData, date: NaiveDate, settings: &'a EngineSettings) -> Self {
        let calculator = AspectCalculator::new(settings.orbs.clone());
        let aspects = calculator.compute_transit_aspects(natal, transit, &settings.sensitivities);
        Self { aspects, chart_hash: natal.fingerprint(), date, settings }
    }

    pub fn background(&self, meter: MeterId) -> Option<CosmicBackground> {
        self.settings
            .dither
            .then(|| CosmicBackground::generate(self.chart_hash, self.date, meter.id()))
    }

    /// Uncalibrated score for one meter.
    pub fn raw_score(&self, meter: MeterId, ballast: f64) -> AstrometerScore {
        let filtered = meter.definition().filter(&self.aspects);
        let contributions = build_contributions(&filtered, self.settings.gaussian_sigma_divisor);
        aggregate(contributions, ballast, self.background(meter).as_ref())
    }

    pub fn reading(&self, meter: MeterId, store: &CalibrationStore) -> Result<MeterReading> {
        let calibration = store.table_for(meter.id())?;
        let ballast = calibration.ballast.unwrap_or(self.settings.default_ballast);
        let score = self.raw_score(meter, ballast);

        let mode = self.settings.normalization;
        let intensity = normalize_intensity(score.intensity, calibration, mode);
        let harmony = normalize_harmony_score(score.harmony_coefficient, calibration, mode);
        let dither = match self.background(meter) {
            Some(bg) if !score.is_empty() => bg.unified_dither,
            _ => 0.0,
        };
        let unified = unified_score(intensity, harmony, dither);
        let quality = QualityLabel::from_scores(intensity, harmony);

        let historical_rank = calibration.history.as_ref().and_then(|h| {
            Some(HistoricalRank {
                intensity: percentile_rank(score.intensity, &h.intensity)?,
                harmony: percentile_rank(score.harmony_coefficient, &h.harmony)?,
            })
        });

        debug!(
            "{} on {}: {} aspects, intensity {:.1}, harmony {:.1}, unified {:.1}",
            meter.id(),
            self.date,
            score.aspect_count,
            intensity,
            harmony,
            unified
        );

        Ok(MeterReading {
            meter,
            group: meter.group(),
            date: self.date,
            unified_score: unified,
            intensity,
            harmony,
            quality,
            state: IntensityLabel::from_score(intensity),
            interpretation: interpret(meter, quality),
            advice: advice(meter, quality),
            top_aspects: top_aspects(&score.contributions, self.settings.top_aspect_limit),
            raw_scores: RawScores::from(&score),
            historical_rank,
            trend: None,
        })
    }
}

pub fn calculate_meter(
    meter: MeterId,
    natal: &ChartData,
    transit: &ChartData,
    date: NaiveDate,
    store: &CalibrationStore,
    settings: &EngineSettings,
) -> Result<MeterReading> {
    ScoringContext::new(natal, transit, date, settings).reading(meter, store)
}

/// Score all 23 meters; trends are attached when yesterday's reading is given.
pub fn calculate_all_meters(
    natal: &ChartData,
    transit: &ChartData,
    date: NaiveDate,
    store: &CalibrationStore,
    settings: &EngineSettings,
    yesterday: Option<&AllMetersReading>,
) -> Result<AllMetersReading> {
    let context = ScoringContext::new(natal, transit, date, settings);
    let mut meters = BTreeMap::new();
    for meter in MeterId::ALL {
        meters.insert(meter, context.reading(meter, store)?);
    }

    let mut reading = AllMetersReading { date, aspect_count: context.aspects.len(), meters };
    if let Some(previous) = yesterday {
        attach_trends(&mut reading, previous, &store.trend_thresholds(settings.trend));
    }
    Ok(reading)
}

/// Uncalibrated scores for every meter, as fed to the calibration builder.
pub fn raw_meter_scores(
    natal: &ChartData,
    transit: &ChartData,
    date: NaiveDate,
    settings: &EngineSettings,
) -> BTreeMap<MeterId, AstrometerScore> {
    let context = ScoringContext::new(natal, transit, date, settings);
    MeterId::ALL
        .into_iter()
        .map(|meter| (meter, context.raw_score(meter, settings.default_ballast)))
        .collect()
}

pub fn meter_trends(today: &MeterReading, yesterday: &MeterReading, thresholds: &TrendThresholds) -> MeterTrends {
    MeterTrends {
        intensity: calculate_trend(today.intensity, yesterday.intensity, thresholds),
        harmony: calculate_trend(today.harmony, yesterday.harmony, thresholds),
        unified_score: calculate_trend(today.unified_score, yesterday.unified_score, thresholds),
    }
}

/// Fill in trends for meters present in both readings.
pub fn attach_trends(today: &mut AllMetersReading, yesterday: &AllMetersReading, thresholds: &TrendThresholds) {
    for (meter, reading) in today.meters.iter_mut() {
        reading.trend = yesterday.meter(*meter).map(|prev| meter_trends(reading, prev, thresholds));
    }
}
