use crate::aspects::types::{AspectType, TransitAspect};
use crate::scoring::quality::quality_factor;
use crate::scoring::transit_power::calculate_transit_power_complete;
use crate::scoring::velocity::velocity_score;
use crate::scoring::weightage::weightage_for;
use crate::western::zodiac::{Planet, ZodiacSign};
use serde::{Deserialize, Serialize};

/// Scored view of one transit aspect, legacy and velocity-based side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectContribution {
    pub label: String,
    pub natal_planet: Planet,
    pub transit_planet: Planet,
    pub aspect_type: AspectType,
    pub natal_sign: ZodiacSign,
    pub natal_house: u8,
    pub orb_deviation: f64,
    /// W_i
    pub weightage: f64,
    /// P_i (static orb with direction and station modifiers)
    pub transit_power: f64,
    /// Q_i
    pub quality_factor: f64,
    /// W_i x P_i
    pub dti_contribution: f64,
    /// W_i x P_i x Q_i
    pub hqs_contribution: f64,
    /// W_i x velocity score
    pub gaussian_power: f64,
    pub polarity: f64,
}

impl AspectContribution {
    pub fn from_aspect(aspect: &TransitAspect, sigma_divisor: f64) -> Self {
        let weightage = weightage_for(aspect);
        let transit_power = calculate_transit_power_complete(aspect);
        let quality = quality_factor(aspect.aspect_type, aspect.transit_planet, aspect.natal_planet);
        let gaussian_power = weightage * velocity_score(aspect, sigma_divisor);

        Self {
            label: aspect.describe(),
            natal_planet: aspect.natal_planet,
            transit_planet: aspect.transit_planet,
            aspect_type: aspect.aspect_type,
            natal_sign: aspect.natal_sign,
            natal_house: aspect.natal_house,
            orb_deviation: aspect.orb_deviation,
            weightage,
            transit_power,
            quality_factor: quality,
            dti_contribution: weightage * transit_power,
            hqs_contribution: weightage * transit_power * quality,
            gaussian_power,
            polarity: quality,
        }
    }

    pub fn key(&self) -> (Planet, Planet, AspectType) {
        (self.transit_planet, self.natal_planet, self.aspect_type)
    }
}

pub fn build_contributions(aspects: &[TransitAspect], sigma_divisor: f64) -> Vec<AspectContribution> {
    aspects
        .iter()
        .map(|a| AspectContribution::from_aspect(a, sigma_divisor))
        .collect()
}
