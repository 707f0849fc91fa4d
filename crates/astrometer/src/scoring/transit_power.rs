//! Static-orb transit power (P_i) and its direction/station modifiers.

use crate::aspects::types::{AspectType, TransitAspect};
use crate::western::zodiac::Planet;
use serde::{Deserialize, Serialize};

/// Deviation at or under which an aspect counts as exact.
pub const EXACT_ORB: f64 = 0.5;

pub const EXACT_MODIFIER: f64 = 1.5;
pub const APPLYING_MODIFIER: f64 = 1.3;
pub const SEPARATING_MODIFIER: f64 = 0.7;

/// (max days from station, multiplier), checked in order.
const STATION_MODIFIERS: &[(f64, f64)] = &[(1.0, 1.8), (2.0, 1.6), (3.0, 1.4), (5.0, 1.2)];

pub fn aspect_base_intensity(aspect: AspectType) -> f64 {
    match aspect {
        AspectType::Conjunction => 10.0,
        AspectType::Opposition => 9.0,
        AspectType::Square => 8.0,
        AspectType::Trine => 6.0,
        AspectType::Sextile => 4.0,
        AspectType::Quincunx => 3.0,
    }
}

/// Slower planets carry more weight as transiting bodies.
pub fn transit_planet_weight(planet: Planet) -> f64 {
    match planet {
        Planet::Moon => 0.8,
        Planet::Mercury | Planet::Venus => 0.9,
        Planet::Sun | Planet::Mars => 1.0,
        Planet::Jupiter => 1.1,
        Planet::Saturn => 1.2,
        Planet::Uranus | Planet::Neptune => 1.3,
        Planet::Pluto => 1.4,
    }
}

/// Linear decay: 1.0 at exact, 0.0 at and beyond `max_orb`.
pub fn orb_factor(deviation: f64, max_orb: f64) -> f64 {
    if max_orb <= 0.0 {
        return 0.0;
    }
    (1.0 - deviation.abs() / max_orb).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectDirection {
    Exact,
    Applying,
    Separating,
    Unknown,
}

impl AspectDirection {
    pub fn modifier(self) -> f64 {
        match self {
            AspectDirection::Exact => EXACT_MODIFIER,
            AspectDirection::Applying => APPLYING_MODIFIER,
            AspectDirection::Separating => SEPARATING_MODIFIER,
            AspectDirection::Unknown => 1.0,
        }
    }
}

pub fn aspect_direction(aspect: &TransitAspect) -> AspectDirection {
    if aspect.orb_deviation <= EXACT_ORB {
        return AspectDirection::Exact;
    }
    match (aspect.today_deviation, aspect.tomorrow_deviation) {
        (Some(today), Some(tomorrow)) if tomorrow < today => AspectDirection::Applying,
        (Some(_), Some(_)) => AspectDirection::Separating,
        _ => AspectDirection::Unknown,
    }
}

/// Boost for slow planets close to a retrograde/direct station.
///
/// The luminaries never station and always get 1.0.
pub fn station_modifier(planet: Planet, days_from_station: Option<f64>) -> f64 {
    if planet.is_luminary() {
        return 1.0;
    }
    let Some(days) = days_from_station.map(f64::abs) else {
        return 1.0;
    };
    STATION_MODIFIERS
        .iter()
        .find(|(max_days, _)| days <= *max_days)
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}

/// P_i before direction and station modifiers.
pub fn calculate_transit_power(aspect: &TransitAspect) -> f64 {
    aspect_base_intensity(aspect.aspect_type)
        * orb_factor(aspect.orb_deviation, aspect.max_orb)
        * transit_planet_weight(aspect.transit_planet)
}

/// P_i with direction and station modifiers applied.
pub fn calculate_transit_power_complete(aspect: &TransitAspect) -> f64 {
    calculate_transit_power(aspect)
        * aspect_direction(aspect).modifier()
        * station_modifier(aspect.transit_planet, aspect.days_from_station)
}
