use crate::aspects::calculator::OrbSettings;
use crate::meters::trend::TrendThresholds;
use crate::normalization::NormalizationMode;
use crate::scoring::aggregator::DEFAULT_BALLAST;
use crate::scoring::velocity::DEFAULT_SIGMA_DIVISOR;
use crate::western::zodiac::Planet;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Tunables for one scoring run. Every field has a default, so a partial
/// config table deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub orbs: OrbSettings,
    /// sigma = tier window / divisor
    pub gaussian_sigma_divisor: f64,
    /// Used when the calibration carries no ballast for a meter
    pub default_ballast: f64,
    /// Mix the seeded cosmic background into non-empty meters
    pub dither: bool,
    pub normalization: NormalizationMode,
    /// Fallback when the calibration has no trend thresholds
    pub trend: TrendThresholds,
    /// Per natal planet weight multiplier, 1.0 when absent
    #[serde(deserialize_with = "planet_map")]
    pub sensitivities: BTreeMap<Planet, f64>,
    pub top_aspect_limit: usize,
}

// Keys go through `Planet::from_str`, so any casing is accepted.
fn planet_map<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<Planet, f64>, D::Error> {
    BTreeMap::<String, f64>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, value)| key.parse::<Planet>().map(|p| (p, value)).map_err(serde::de::Error::custom))
        .collect()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            orbs: OrbSettings::default(),
            gaussian_sigma_divisor: DEFAULT_SIGMA_DIVISOR,
            default_ballast: DEFAULT_BALLAST,
            dither: true,
            normalization: NormalizationMode::Percentile,
            trend: TrendThresholds::default(),
            sensitivities: BTreeMap::new(),
            top_aspect_limit: 5,
        }
    }
}

impl EngineSettings {
    pub fn sensitivity(&self, planet: Planet) -> f64 {
        self.sensitivities.get(&planet).copied().unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_deserialize() {
        let settings: EngineSettings =
            serde_json::from_str(r#"{"dither": false, "sensitivities": {"Moon": 1.5}}"#).unwrap();
        assert!(!settings.dither);
        assert_eq!(settings.sensitivity(Planet::Moon), 1.5);
        assert_eq!(settings.sensitivity(Planet::Sun), 1.0);
        assert_eq!(settings.gaussian_sigma_divisor, 2.0);
        assert_eq!(settings.top_aspect_limit, 5);
    }

    #[test]
    fn test_unknown_sensitivity_planet_is_rejected() {
        let result: Result<EngineSettings, _> = serde_json::from_str(r#"{"sensitivities": {"chiron": 2.0}}"#);
        assert!(result.is_err());
    }
}
