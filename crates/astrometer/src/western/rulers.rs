//! Sign rulers for Western astrology.
//!
//! Maps zodiac signs to their planetary rulers (traditional and modern).

use crate::western::zodiac::{Planet, ZodiacSign};

const MODERN_RULERS: [Planet; 12] = [
    Planet::Mars,    // Aries
    Planet::Venus,   // Taurus
    Planet::Mercury, // Gemini
    Planet::Moon,    // Cancer
    Planet::Sun,     // Leo
    Planet::Mercury, // Virgo
    Planet::Venus,   // Libra
    Planet::Pluto,   // Scorpio (modern)
    Planet::Jupiter, // Sagittarius
    Planet::Saturn,  // Capricorn
    Planet::Uranus,  // Aquarius (modern)
    Planet::Neptune, // Pisces (modern)
];

const TRADITIONAL_RULERS: [Planet; 12] = [
    Planet::Mars,    // Aries
    Planet::Venus,   // Taurus
    Planet::Mercury, // Gemini
    Planet::Moon,    // Cancer
    Planet::Sun,     // Leo
    Planet::Mercury, // Virgo
    Planet::Venus,   // Libra
    Planet::Mars,    // Scorpio (traditional)
    Planet::Jupiter, // Sagittarius
    Planet::Saturn,  // Capricorn
    Planet::Saturn,  // Aquarius (traditional)
    Planet::Jupiter, // Pisces (traditional)
];

/// Get sign ruler
pub fn get_sign_ruler(sign: ZodiacSign, modern: bool) -> Planet {
    if modern {
        MODERN_RULERS[sign.index()]
    } else {
        TRADITIONAL_RULERS[sign.index()]
    }
}

/// Get sign ruler from longitude
pub fn get_sign_ruler_from_longitude(longitude: f64, modern: bool) -> Planet {
    get_sign_ruler(ZodiacSign::from_longitude(longitude), modern)
}

/// Whether `planet` is the (modern) chart ruler for an ascendant sign.
pub fn is_chart_ruler(planet: Planet, ascendant: ZodiacSign) -> bool {
    get_sign_ruler(ascendant, true) == planet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_sign_ruler_traditional() {
        assert_eq!(get_sign_ruler(ZodiacSign::Aries, false), Planet::Mars);
        assert_eq!(get_sign_ruler(ZodiacSign::Cancer, false), Planet::Moon);
        assert_eq!(get_sign_ruler(ZodiacSign::Leo, false), Planet::Sun);
        assert_eq!(get_sign_ruler(ZodiacSign::Scorpio, false), Planet::Mars);
    }

    #[test]
    fn test_get_sign_ruler_modern() {
        assert_eq!(get_sign_ruler(ZodiacSign::Scorpio, true), Planet::Pluto);
        assert_eq!(get_sign_ruler(ZodiacSign::Aquarius, true), Planet::Uranus);
        assert_eq!(get_sign_ruler(ZodiacSign::Pisces, true), Planet::Neptune);
    }

    #[test]
    fn test_ruler_from_longitude() {
        assert_eq!(get_sign_ruler_from_longitude(135.0, true), Planet::Sun);
        assert!(is_chart_ruler(Planet::Venus, ZodiacSign::Libra));
        assert!(!is_chart_ruler(Planet::Mars, ZodiacSign::Scorpio));
    }
}
