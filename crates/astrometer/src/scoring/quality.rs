//! Aspect polarity (Q_i) in [-1, +1].

use crate::aspects::types::AspectType;
use crate::error::Result;
use crate::western::zodiac::Planet;

pub const TRANSFORMATIONAL_CONJUNCTION: f64 = -0.3;
pub const BENEFIC_CONJUNCTION: f64 = 0.8;
pub const MALEFIC_CONJUNCTION: f64 = -0.8;
pub const MIXED_CONJUNCTION: f64 = 0.2;
pub const NEUTRAL_CONJUNCTION: f64 = 0.0;

/// Conjunction polarity depends on who meets whom. Order independent.
pub fn conjunction_quality(a: Planet, b: Planet) -> f64 {
    // Outer planets take precedence over the benefic/malefic check
    if a.is_transformational() || b.is_transformational() {
        return TRANSFORMATIONAL_CONJUNCTION;
    }
    match (a.is_benefic(), a.is_malefic(), b.is_benefic(), b.is_malefic()) {
        (true, _, true, _) => BENEFIC_CONJUNCTION,
        (_, true, _, true) => MALEFIC_CONJUNCTION,
        (true, _, _, true) | (_, true, true, _) => MIXED_CONJUNCTION,
        _ => NEUTRAL_CONJUNCTION,
    }
}

pub fn quality_factor(aspect: AspectType, transit: Planet, natal: Planet) -> f64 {
    match aspect {
        AspectType::Trine | AspectType::Sextile => 1.0,
        AspectType::Square | AspectType::Opposition => -1.0,
        AspectType::Quincunx => -0.5,
        AspectType::Conjunction => conjunction_quality(transit, natal),
    }
}

/// Quality lookup from an aspect name; unknown names are an error.
pub fn quality_factor_named(aspect: &str, transit: Planet, natal: Planet) -> Result<f64> {
    let aspect: AspectType = aspect.parse()?;
    Ok(quality_factor(aspect, transit, natal))
}
