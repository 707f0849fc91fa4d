//! Natal planet importance (W_i).
//!
//! W = (planet base + dignity + chart-ruler bonus) x house multiplier x sensitivity

use crate::aspects::types::TransitAspect;
use crate::western::dignities::dignity_score;
use crate::western::rulers::is_chart_ruler;
use crate::western::zodiac::{Planet, ZodiacSign};

pub const RULER_BONUS: f64 = 5.0;

/// Fixed importance per natal planet: luminaries highest, outer planets lowest.
pub fn planet_base_score(planet: Planet) -> f64 {
    match planet {
        Planet::Sun | Planet::Moon => 10.0,
        Planet::Mercury | Planet::Venus | Planet::Mars => 7.0,
        Planet::Jupiter | Planet::Saturn => 5.0,
        Planet::Uranus | Planet::Neptune | Planet::Pluto => 3.0,
    }
}

/// Angular x3, succedent x2, cadent x1.
pub fn house_multiplier(house: u8) -> f64 {
    match house {
        1 | 4 | 7 | 10 => 3.0,
        2 | 5 | 8 | 11 => 2.0,
        _ => 1.0,
    }
}

pub fn ruler_bonus(planet: Planet, ascendant: Option<ZodiacSign>) -> f64 {
    match ascendant {
        Some(asc) if is_chart_ruler(planet, asc) => RULER_BONUS,
        _ => 0.0,
    }
}

pub fn calculate_weightage(
    planet: Planet,
    sign: ZodiacSign,
    house: u8,
    degree_in_sign: Option<f64>,
    ascendant: Option<ZodiacSign>,
    sensitivity: f64,
) -> f64 {
    let dignity = dignity_score(planet, sign, degree_in_sign) as f64;
    let base = planet_base_score(planet) + dignity + ruler_bonus(planet, ascendant);
    base * house_multiplier(house) * sensitivity
}

/// Weightage of the natal side of a transit aspect.
pub fn weightage_for(aspect: &TransitAspect) -> f64 {
    calculate_weightage(
        aspect.natal_planet,
        aspect.natal_sign,
        aspect.natal_house,
        aspect.natal_degree_in_sign,
        aspect.ascendant_sign,
        aspect.sensitivity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspects::types::AspectType;

    #[test]
    fn test_sun_in_leo_tenth_house_chart_ruler() {
        let w = calculate_weightage(Planet::Sun, ZodiacSign::Leo, 10, Some(15.0), Some(ZodiacSign::Leo), 1.0);
        assert_eq!(w, 60.0);
    }

    #[test]
    fn test_house_multipliers() {
        for h in [1, 4, 7, 10] {
            assert_eq!(house_multiplier(h), 3.0);
        }
        for h in [2, 5, 8, 11] {
            assert_eq!(house_multiplier(h), 2.0);
        }
        for h in [3, 6, 9, 12] {
            assert_eq!(house_multiplier(h), 1.0);
        }
    }

    #[test]
    fn test_detriment_and_sensitivity() {
        // Saturn in Leo (detriment), 3rd house, no ruler bonus, sensitivity 1.5
        let w = calculate_weightage(Planet::Saturn, ZodiacSign::Leo, 3, Some(5.0), Some(ZodiacSign::Aries), 1.5);
        assert_eq!(w, (5.0 - 5.0) * 1.0 * 1.5);
        // Pluto rules a Scorpio ascendant under modern rulership
        let w = calculate_weightage(Planet::Pluto, ZodiacSign::Virgo, 2, None, Some(ZodiacSign::Scorpio), 1.0);
        assert_eq!(w, (3.0 + 0.0 + 5.0) * 2.0);
    }

    #[test]
    fn test_aspect_without_degree_uses_sign_dignity() {
        // Venus exalted in Pisces at 27°
        let aspect = TransitAspect::new(Planet::Venus, ZodiacSign::Pisces, 3, Planet::Mars, AspectType::Trine, 1.0, 7.0);
        assert_eq!(aspect.natal_degree_in_sign, None);
        assert_eq!(weightage_for(&aspect), 7.0 + 4.0);

        let far = aspect.clone().with_natal_degree(10.0);
        assert_eq!(weightage_for(&far), 7.0);
        let near = aspect.with_natal_degree(25.0);
        assert_eq!(weightage_for(&near), 7.0 + 4.0);
    }
}
