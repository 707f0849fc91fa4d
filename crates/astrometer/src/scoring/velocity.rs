//! Velocity-aware Gaussian transit scoring.
//!
//! Each transiting body belongs to a speed tier with its own time window and
//! weight. The orb is converted to "days from exact" using the body's daily
//! motion and scored with a Gaussian, so a fast Moon aspect spikes and fades
//! within a day while an outer-planet aspect stays strong for weeks.

use crate::aspects::types::TransitAspect;
use crate::western::zodiac::Planet;
use serde::{Deserialize, Serialize};

/// Daily motion assumed when the ephemeris did not supply one.
pub const FALLBACK_SPEED: f64 = 1.0;
/// Floor on |speed| so stationary bodies do not divide by zero.
pub const MIN_SPEED: f64 = 0.01;
pub const DEFAULT_SIGMA_DIVISOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    /// Moon
    Trigger,
    /// Sun, Mercury, Venus, Mars
    Event,
    /// Jupiter, Saturn
    Season,
    /// Uranus, Neptune, Pluto
    Era,
}

impl SpeedTier {
    pub fn for_planet(planet: Planet) -> SpeedTier {
        match planet {
            Planet::Moon => SpeedTier::Trigger,
            Planet::Sun | Planet::Mercury | Planet::Venus | Planet::Mars => SpeedTier::Event,
            Planet::Jupiter | Planet::Saturn => SpeedTier::Season,
            Planet::Uranus | Planet::Neptune | Planet::Pluto => SpeedTier::Era,
        }
    }

    /// Time window in days over which an aspect of this tier is felt.
    pub fn window_days(self) -> f64 {
        match self {
            SpeedTier::Trigger => 1.0,
            SpeedTier::Event => 5.0,
            SpeedTier::Season => 30.0,
            SpeedTier::Era => 90.0,
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            SpeedTier::Trigger => 1.0,
            SpeedTier::Event => 1.5,
            SpeedTier::Season => 2.5,
            SpeedTier::Era => 3.5,
        }
    }

    pub fn sigma(self, divisor: f64) -> f64 {
        self.window_days() / divisor
    }
}

/// Days until (or since) exactness implied by the orb and daily motion.
pub fn days_from_exact(orb_deviation: f64, speed: Option<f64>) -> f64 {
    let speed = speed.unwrap_or(FALLBACK_SPEED).abs().max(MIN_SPEED);
    orb_deviation.abs() / speed
}

/// exp(-d^2 / (2 sigma^2)); 1.0 at exact.
pub fn gaussian_falloff(days: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return if days == 0.0 { 1.0 } else { 0.0 };
    }
    (-(days * days) / (2.0 * sigma * sigma)).exp()
}

/// Tier-weighted Gaussian score for one transit aspect.
pub fn velocity_score(aspect: &TransitAspect, sigma_divisor: f64) -> f64 {
    let tier = SpeedTier::for_planet(aspect.transit_planet);
    if aspect.transit_speed.is_none() {
        log::warn!(
            "no speed for transit {}; assuming {FALLBACK_SPEED} deg/day",
            aspect.transit_planet.id()
        );
    }
    let days = days_from_exact(aspect.orb_deviation, aspect.transit_speed);
    tier.weight() * gaussian_falloff(days, tier.sigma(sigma_divisor))
}
