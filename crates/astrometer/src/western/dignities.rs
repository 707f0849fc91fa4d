//! Essential dignity scoring for Western astrology.
//!
//! Domicile and detriment are decided by sign alone. Exaltation and fall
//! additionally require the planet to sit within [`EXALTATION_ORB`] degrees
//! of the exact exaltation (or fall) degree when a degree is known.

use crate::western::zodiac::{Planet, ZodiacSign};
use serde::{Deserialize, Serialize};

/// Degrees either side of the exact exaltation/fall degree.
pub const EXALTATION_ORB: f64 = 5.0;

pub const DOMICILE_SCORE: i32 = 5;
pub const EXALTATION_SCORE: i32 = 4;
pub const PEREGRINE_SCORE: i32 = 0;
pub const FALL_SCORE: i32 = -4;
pub const DETRIMENT_SCORE: i32 = -5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DignityType {
    Domicile,
    Exaltation,
    Peregrine,
    Fall,
    Detriment,
}

impl DignityType {
    pub fn score(self) -> i32 {
        match self {
            DignityType::Domicile => DOMICILE_SCORE,
            DignityType::Exaltation => EXALTATION_SCORE,
            DignityType::Peregrine => PEREGRINE_SCORE,
            DignityType::Fall => FALL_SCORE,
            DignityType::Detriment => DETRIMENT_SCORE,
        }
    }
}

/// Traditional dignity table for one planet.
#[derive(Debug, Clone, Copy)]
pub struct PlanetDignities {
    pub domicile: &'static [ZodiacSign],
    pub detriment: &'static [ZodiacSign],
    /// Exaltation sign and exact degree within it.
    pub exaltation: (ZodiacSign, f64),
    /// Fall sign and exact degree within it.
    pub fall: (ZodiacSign, f64),
}

use ZodiacSign::*;

/// Dignities for the seven traditional planets. Outer planets have none.
pub fn planet_dignities(planet: Planet) -> Option<PlanetDignities> {
    let table = match planet {
        Planet::Sun => PlanetDignities {
            domicile: &[Leo],
            detriment: &[Aquarius],
            exaltation: (Aries, 19.0),
            fall: (Libra, 19.0),
        },
        Planet::Moon => PlanetDignities {
            domicile: &[Cancer],
            detriment: &[Capricorn],
            exaltation: (Taurus, 3.0),
            fall: (Scorpio, 3.0),
        },
        Planet::Mercury => PlanetDignities {
            domicile: &[Gemini, Virgo],
            detriment: &[Sagittarius, Pisces],
            exaltation: (Virgo, 15.0),
            fall: (Pisces, 15.0),
        },
        Planet::Venus => PlanetDignities {
            domicile: &[Taurus, Libra],
            detriment: &[Scorpio, Aries],
            exaltation: (Pisces, 27.0),
            fall: (Virgo, 27.0),
        },
        Planet::Mars => PlanetDignities {
            domicile: &[Aries, Scorpio],
            detriment: &[Libra, Taurus],
            exaltation: (Capricorn, 28.0),
            fall: (Cancer, 28.0),
        },
        Planet::Jupiter => PlanetDignities {
            domicile: &[Sagittarius, Pisces],
            detriment: &[Gemini, Virgo],
            exaltation: (Cancer, 15.0),
            fall: (Capricorn, 15.0),
        },
        Planet::Saturn => PlanetDignities {
            domicile: &[Capricorn, Aquarius],
            detriment: &[Cancer, Leo],
            exaltation: (Libra, 21.0),
            fall: (Aries, 21.0),
        },
        Planet::Uranus | Planet::Neptune | Planet::Pluto => return None,
    };
    Some(table)
}

/// Distance between two in-sign degrees, wrapping at the 0/30 boundary.
fn in_sign_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 30.0;
    diff.min(30.0 - diff)
}

fn within_exaltation_orb(degree: Option<f64>, exact: f64) -> bool {
    match degree {
        Some(d) => in_sign_distance(d, exact) <= EXALTATION_ORB,
        // No degree given: sign match alone counts
        None => true,
    }
}

/// Classify a planet's essential dignity in a sign.
pub fn classify_dignity(planet: Planet, sign: ZodiacSign, degree: Option<f64>) -> DignityType {
    let Some(table) = planet_dignities(planet) else {
        return DignityType::Peregrine;
    };

    if table.domicile.contains(&sign) {
        return DignityType::Domicile;
    }
    if table.detriment.contains(&sign) {
        return DignityType::Detriment;
    }

    let (exalt_sign, exalt_degree) = table.exaltation;
    if sign == exalt_sign {
        return if within_exaltation_orb(degree, exalt_degree) {
            DignityType::Exaltation
        } else {
            DignityType::Peregrine
        };
    }

    let (fall_sign, fall_degree) = table.fall;
    if sign == fall_sign {
        return if within_exaltation_orb(degree, fall_degree) {
            DignityType::Fall
        } else {
            DignityType::Peregrine
        };
    }

    DignityType::Peregrine
}

/// Essential dignity score in {-5, -4, 0, 4, 5}.
pub fn dignity_score(planet: Planet, sign: ZodiacSign, degree: Option<f64>) -> i32 {
    classify_dignity(planet, sign, degree).score()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domicile_and_detriment() {
        assert_eq!(dignity_score(Planet::Sun, Leo, Some(10.0)), 5);
        assert_eq!(dignity_score(Planet::Sun, Aquarius, Some(10.0)), -5);
        assert_eq!(dignity_score(Planet::Moon, Cancer, None), 5);
    }

    #[test]
    fn test_exaltation_requires_orb() {
        assert_eq!(dignity_score(Planet::Sun, Aries, Some(19.0)), 4);
        assert_eq!(dignity_score(Planet::Sun, Aries, Some(14.0)), 4);
        assert_eq!(dignity_score(Planet::Sun, Aries, Some(13.9)), 0);
        assert_eq!(dignity_score(Planet::Sun, Aries, Some(2.0)), 0);
    }

    #[test]
    fn test_exaltation_orb_wraps_sign_boundary() {
        // Venus exact at 27 Pisces; 1 Pisces is 4 degrees away across the wrap
        assert_eq!(dignity_score(Planet::Venus, Pisces, Some(1.0)), 4);
        // Moon exact at 3 Taurus; 29 Taurus is 4 degrees away across the wrap
        assert_eq!(dignity_score(Planet::Moon, Taurus, Some(29.0)), 4);
    }

    #[test]
    fn test_fall_without_degree_gets_benefit_of_doubt() {
        assert_eq!(dignity_score(Planet::Saturn, Aries, None), -4);
        assert_eq!(dignity_score(Planet::Saturn, Aries, Some(21.5)), -4);
        assert_eq!(dignity_score(Planet::Saturn, Aries, Some(1.0)), 0);
    }

    #[test]
    fn test_domicile_checked_before_exaltation() {
        // Mercury rules and is exalted in Virgo
        assert_eq!(dignity_score(Planet::Mercury, Virgo, Some(2.0)), 5);
        assert_eq!(dignity_score(Planet::Mercury, Pisces, Some(15.0)), -5);
    }

    #[test]
    fn test_outer_planets_are_neutral() {
        for sign in ZodiacSign::ALL {
            assert_eq!(dignity_score(Planet::Pluto, sign, None), 0);
            assert_eq!(dignity_score(Planet::Uranus, sign, Some(15.0)), 0);
            assert_eq!(dignity_score(Planet::Neptune, sign, Some(0.0)), 0);
        }
    }
}
