use crate::aspects::types::{AspectMatch, AspectType, TransitAspect};
use crate::ephemeris::types::ChartData;
use crate::western::zodiac::Planet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Orb settings per aspect type, widened for the luminaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbSettings {
    pub conjunction: f64,
    pub sextile: f64,
    pub square: f64,
    pub trine: f64,
    pub quincunx: f64,
    pub opposition: f64,
    /// Added when the Moon is either body
    pub moon_bonus: f64,
    /// Added when the Sun is either body (and the Moon is not)
    pub sun_bonus: f64,
}

impl Default for OrbSettings {
    fn default() -> Self {
        Self {
            conjunction: 8.0,
            sextile: 5.0,
            square: 7.0,
            trine: 7.0,
            quincunx: 3.0,
            opposition: 8.0,
            moon_bonus: 2.0,
            sun_bonus: 1.0,
        }
    }
}

impl OrbSettings {
    pub fn base_orb(&self, aspect: AspectType) -> f64 {
        match aspect {
            AspectType::Conjunction => self.conjunction,
            AspectType::Sextile => self.sextile,
            AspectType::Square => self.square,
            AspectType::Trine => self.trine,
            AspectType::Quincunx => self.quincunx,
            AspectType::Opposition => self.opposition,
        }
    }

    /// Maximum orb for an aspect between two specific bodies.
    pub fn max_orb(&self, aspect: AspectType, a: Planet, b: Planet) -> f64 {
        let bonus = if a == Planet::Moon || b == Planet::Moon {
            self.moon_bonus
        } else if a == Planet::Sun || b == Planet::Sun {
            self.sun_bonus
        } else {
            0.0
        };
        self.base_orb(aspect) + bonus
    }
}

/// Angular separation folded into 0-180 degrees.
pub fn angular_separation(lon1: f64, lon2: f64) -> f64 {
    let raw_diff = (lon1 - lon2).rem_euclid(360.0);
    if raw_diff > 180.0 {
        360.0 - raw_diff
    } else {
        raw_diff
    }
}

/// Deviation of a pair of longitudes from an aspect's exact angle.
pub fn deviation_from(lon1: f64, lon2: f64, aspect: AspectType) -> f64 {
    (angular_separation(lon1, lon2) - aspect.angle()).abs()
}

/// Aspect calculator
#[derive(Debug, Clone, Default)]
pub struct AspectCalculator {
    orbs: OrbSettings,
}

impl AspectCalculator {
    /// Create a new aspect calculator
    pub fn new(orbs: OrbSettings) -> Self {
        Self { orbs }
    }

    pub fn orbs(&self) -> &OrbSettings {
        &self.orbs
    }

    /// Tightest major aspect between two bodies, if any is within orb.
    pub fn calculate_aspect(&self, lon1: f64, lon2: f64, p1: Planet, p2: Planet) -> Option<AspectMatch> {
        let separation = angular_separation(lon1, lon2);

        AspectType::ALL
            .iter()
            .filter_map(|&aspect_type| {
                let orb = (separation - aspect_type.angle()).abs();
                let max_orb = self.orbs.max_orb(aspect_type, p1, p2);
                (orb <= max_orb).then_some(AspectMatch { aspect_type, orb, max_orb })
            })
            .min_by(|a, b| a.orb.total_cmp(&b.orb))
    }

    /// Compute every natal x transit aspect within orb.
    ///
    /// `sensitivities` scales the weight of individual natal planets; planets
    /// not listed use 1.0. Transit speed is carried through unchanged (possibly
    /// missing) so the scorers can apply their own fallback.
    pub fn compute_transit_aspects(
        &self,
        natal: &ChartData,
        transit: &ChartData,
        sensitivities: &BTreeMap<Planet, f64>,
    ) -> Vec<TransitAspect> {
        let ascendant_sign = natal.ascendant_sign();
        let mut aspects = Vec::new();

        for natal_pos in &natal.planets {
            for transit_pos in &transit.planets {
                let Some(found) = self.calculate_aspect(
                    natal_pos.absolute_degree,
                    transit_pos.absolute_degree,
                    natal_pos.name,
                    transit_pos.name,
                ) else {
                    continue;
                };

                // Natal positions are fixed; project the transit one day ahead
                let tomorrow_deviation = transit_pos.speed.map(|speed| {
                    deviation_from(
                        natal_pos.absolute_degree,
                        transit_pos.absolute_degree + speed,
                        found.aspect_type,
                    )
                });

                aspects.push(TransitAspect {
                    natal_planet: natal_pos.name,
                    natal_sign: natal_pos.sign,
                    natal_house: natal_pos.house,
                    natal_degree_in_sign: Some(natal_pos.degree_in_sign),
                    ascendant_sign,
                    sensitivity: sensitivities.get(&natal_pos.name).copied().unwrap_or(1.0),
                    transit_planet: transit_pos.name,
                    aspect_type: found.aspect_type,
                    orb_deviation: found.orb,
                    max_orb: found.max_orb,
                    transit_speed: transit_pos.speed,
                    today_deviation: Some(found.orb),
                    tomorrow_deviation,
                    days_from_station: transit_pos.days_from_station,
                });
            }
        }

        aspects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::types::PlanetPosition;

    #[test]
    fn test_angular_separation_wraps() {
        assert!((angular_separation(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((angular_separation(10.0, 350.0) - 20.0).abs() < 1e-9);
        assert!((angular_separation(0.0, 180.0) - 180.0).abs() < 1e-9);
        assert!((angular_separation(100.0, 278.0) - 178.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_aspect_conjunction() {
        let calculator = AspectCalculator::default();
        let aspect = calculator
            .calculate_aspect(100.0, 102.0, Planet::Mars, Planet::Venus)
            .unwrap();
        assert_eq!(aspect.aspect_type, AspectType::Conjunction);
        assert!((aspect.orb - 2.0).abs() < 1e-9);
        assert_eq!(aspect.max_orb, 8.0);
    }

    #[test]
    fn test_keeps_tightest_match() {
        // 145 degrees sits within both widened orbs: quincunx 5 off, trine 25 off
        let orbs = OrbSettings { quincunx: 6.0, trine: 30.0, ..OrbSettings::default() };
        let calculator = AspectCalculator::new(orbs);
        let aspect = calculator.calculate_aspect(0.0, 145.0, Planet::Mars, Planet::Saturn).unwrap();
        assert_eq!(aspect.aspect_type, AspectType::Quincunx);
    }

    #[test]
    fn test_moon_gets_wider_orbs() {
        let calculator = AspectCalculator::default();
        assert!(calculator.calculate_aspect(0.0, 99.0, Planet::Mars, Planet::Saturn).is_none());
        let with_moon = calculator.calculate_aspect(0.0, 99.0, Planet::Moon, Planet::Saturn).unwrap();
        assert_eq!(with_moon.aspect_type, AspectType::Square);
        assert_eq!(with_moon.max_orb, 9.0);
    }

    #[test]
    fn test_compute_transit_aspects_projects_tomorrow() {
        let natal = ChartData::new(vec![PlanetPosition::at_longitude(Planet::Sun, 135.0, 10, None)], Some(125.0))
            .unwrap();
        let transit = ChartData::new(
            vec![PlanetPosition::at_longitude(Planet::Saturn, 43.0, 7, Some(0.1))],
            None,
        )
        .unwrap();
        let aspects =
            AspectCalculator::default().compute_transit_aspects(&natal, &transit, &BTreeMap::new());
        assert_eq!(aspects.len(), 1);
        let a = &aspects[0];
        assert_eq!(a.aspect_type, AspectType::Square);
        assert!((a.orb_deviation - 2.0).abs() < 1e-9);
        // Saturn moving forward toward 45: applying
        assert!(a.tomorrow_deviation.unwrap() < a.today_deviation.unwrap());
        assert_eq!(a.ascendant_sign, Some(crate::western::ZodiacSign::Leo));
    }
}
