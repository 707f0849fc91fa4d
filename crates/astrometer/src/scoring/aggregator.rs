//! Sums contributions into the legacy DTI/HQS pair and the decoupled
//! Intensity/Harmony pair.

use crate::scoring::background::CosmicBackground;
use crate::scoring::contribution::AspectContribution;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BALLAST: f64 = 10.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AstrometerScore {
    /// Σ W·P
    pub dti: f64,
    /// Σ W·P·Q
    pub hqs: f64,
    /// Σ W·G plus background, never negative
    pub intensity: f64,
    /// Σ W·G·Q plus background lean
    pub harmony_numerator: f64,
    /// numerator / (intensity + ballast), in [-1, 1]
    pub harmony_coefficient: f64,
    pub ballast: f64,
    pub aspect_count: usize,
    pub contributions: Vec<AspectContribution>,
}

impl AstrometerScore {
    pub fn is_empty(&self) -> bool {
        self.aspect_count == 0
    }
}

/// Legacy coupled metrics: (DTI, HQS).
pub fn calculate_dti_hqs(contributions: &[AspectContribution]) -> (f64, f64) {
    contributions.iter().fold((0.0, 0.0), |(dti, hqs), c| {
        (dti + c.dti_contribution, hqs + c.hqs_contribution)
    })
}

/// Harmony coefficient with ballast in the denominator.
pub fn harmony_coefficient(numerator: f64, intensity: f64, ballast: f64) -> f64 {
    let denominator = intensity + ballast;
    if denominator <= 0.0 {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}

/// Aggregate one meter's contributions.
///
/// An empty list is a quiet period and yields an all-zero score; the
/// background is only mixed in when there is at least one aspect.
pub fn aggregate(
    contributions: Vec<AspectContribution>,
    ballast: f64,
    background: Option<&CosmicBackground>,
) -> AstrometerScore {
    if contributions.is_empty() {
        return AstrometerScore { ballast, ..AstrometerScore::default() };
    }

    let (dti, hqs) = calculate_dti_hqs(&contributions);
    let mut intensity: f64 = contributions.iter().map(|c| c.gaussian_power).sum();
    let mut numerator: f64 = contributions.iter().map(|c| c.gaussian_power * c.polarity).sum();

    if let Some(bg) = background {
        intensity += bg.intensity;
        numerator += bg.harmony_offset();
    }

    AstrometerScore {
        dti,
        hqs,
        intensity: intensity.max(0.0),
        harmony_numerator: numerator,
        harmony_coefficient: harmony_coefficient(numerator, intensity.max(0.0), ballast),
        ballast,
        aspect_count: contributions.len(),
        contributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspects::types::AspectType;
    use crate::western::zodiac::{Planet, ZodiacSign};

    fn contribution(gaussian_power: f64, polarity: f64, dti: f64) -> AspectContribution {
        AspectContribution {
            label: String::new(),
            natal_planet: Planet::Sun,
            transit_planet: Planet::Mars,
            aspect_type: AspectType::Trine,
            natal_sign: ZodiacSign::Leo,
            natal_house: 1,
            orb_deviation: 1.0,
            weightage: 1.0,
            transit_power: dti,
            quality_factor: polarity,
            dti_contribution: dti,
            hqs_contribution: dti * polarity,
            gaussian_power,
            polarity,
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        let bg = CosmicBackground { intensity: 2.0, bias: 0.3, unified_dither: 4.0 };
        let score = aggregate(Vec::new(), 10.0, Some(&bg));
        assert_eq!(score.dti, 0.0);
        assert_eq!(score.intensity, 0.0);
        assert_eq!(score.harmony_coefficient, 0.0);
        assert!(score.is_empty());
    }

    #[test]
    fn test_legacy_sums() {
        let score = aggregate(vec![contribution(5.0, 1.0, 10.0), contribution(3.0, -1.0, 4.0)], 10.0, None);
        assert_eq!(score.dti, 14.0);
        assert_eq!(score.hqs, 6.0);
        assert_eq!(score.intensity, 8.0);
        assert_eq!(score.harmony_numerator, 2.0);
        assert_eq!(score.harmony_coefficient, 2.0 / 18.0);
    }

    #[test]
    fn test_ballast_damps_single_weak_aspect() {
        let with_ballast = aggregate(vec![contribution(1.0, 1.0, 1.0)], 10.0, None);
        let without = aggregate(vec![contribution(1.0, 1.0, 1.0)], 0.0, None);
        assert_eq!(without.harmony_coefficient, 1.0);
        assert!(with_ballast.harmony_coefficient < 0.1);
    }

    #[test]
    fn test_background_is_mixed_in() {
        let bg = CosmicBackground { intensity: 2.0, bias: -0.25, unified_dither: 0.0 };
        let score = aggregate(vec![contribution(4.0, 0.5, 1.0)], 10.0, Some(&bg));
        assert_eq!(score.intensity, 6.0);
        assert_eq!(score.harmony_numerator, 2.0 - 0.5);
        assert_eq!(score.harmony_coefficient, 1.5 / 16.0);
    }

    #[test]
    fn test_harmony_is_bounded() {
        let score = aggregate(vec![contribution(100.0, -1.0, 1.0)], 0.0, None);
        assert_eq!(score.harmony_coefficient, -1.0);
    }
}
