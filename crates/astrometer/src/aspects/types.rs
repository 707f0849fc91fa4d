use crate::error::AstrometerError;
use crate::western::zodiac::{Planet, ZodiacSign};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Major aspect types scored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectType {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Quincunx,
    Opposition,
}

impl AspectType {
    pub const ALL: [AspectType; 6] = [
        AspectType::Conjunction,
        AspectType::Sextile,
        AspectType::Square,
        AspectType::Trine,
        AspectType::Quincunx,
        AspectType::Opposition,
    ];

    /// Exact angle for this aspect
    pub fn angle(self) -> f64 {
        match self {
            AspectType::Conjunction => 0.0,
            AspectType::Sextile => 60.0,
            AspectType::Square => 90.0,
            AspectType::Trine => 120.0,
            AspectType::Quincunx => 150.0,
            AspectType::Opposition => 180.0,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            AspectType::Conjunction => "conjunction",
            AspectType::Sextile => "sextile",
            AspectType::Square => "square",
            AspectType::Trine => "trine",
            AspectType::Quincunx => "quincunx",
            AspectType::Opposition => "opposition",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectType::Conjunction => "Conjunction",
            AspectType::Sextile => "Sextile",
            AspectType::Square => "Square",
            AspectType::Trine => "Trine",
            AspectType::Quincunx => "Quincunx",
            AspectType::Opposition => "Opposition",
        }
    }

    /// Square, opposition and quincunx.
    pub fn is_hard(self) -> bool {
        matches!(self, AspectType::Square | AspectType::Opposition | AspectType::Quincunx)
    }
}

impl fmt::Display for AspectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AspectType {
    type Err = AstrometerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        AspectType::ALL
            .iter()
            .copied()
            .find(|a| a.id() == needle)
            .ok_or_else(|| AstrometerError::UnknownAspectType(s.to_string()))
    }
}

/// Result of matching one angular separation against the major aspects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectMatch {
    pub aspect_type: AspectType,
    /// Deviation from the exact angle, in degrees
    pub orb: f64,
    /// Maximum orb allowed for this aspect and planet pair
    pub max_orb: f64,
}

/// One natal planet receiving one transit aspect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitAspect {
    pub natal_planet: Planet,
    pub natal_sign: ZodiacSign,
    pub natal_house: u8,
    /// Absent when the chart gave no degree; dignity then goes by sign alone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natal_degree_in_sign: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascendant_sign: Option<ZodiacSign>,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    pub transit_planet: Planet,
    pub aspect_type: AspectType,
    pub orb_deviation: f64,
    pub max_orb: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today_deviation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tomorrow_deviation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_from_station: Option<f64>,
}

fn default_sensitivity() -> f64 {
    1.0
}

impl TransitAspect {
    /// Minimal aspect with every optional field empty and sensitivity 1.0.
    pub fn new(
        natal_planet: Planet,
        natal_sign: ZodiacSign,
        natal_house: u8,
        transit_planet: Planet,
        aspect_type: AspectType,
        orb_deviation: f64,
        max_orb: f64,
    ) -> Self {
        Self {
            natal_planet,
            natal_sign,
            natal_house,
            natal_degree_in_sign: None,
            ascendant_sign: None,
            sensitivity: default_sensitivity(),
            transit_planet,
            aspect_type,
            orb_deviation,
            max_orb,
            transit_speed: None,
            today_deviation: None,
            tomorrow_deviation: None,
            days_from_station: None,
        }
    }

    pub fn with_natal_degree(mut self, degree_in_sign: f64) -> Self {
        self.natal_degree_in_sign = Some(degree_in_sign);
        self
    }

    /// Stable identity used for de-duplication and display keys.
    pub fn key(&self) -> (Planet, Planet, AspectType) {
        (self.transit_planet, self.natal_planet, self.aspect_type)
    }

    pub fn describe(&self) -> String {
        format!(
            "Transit {} {} natal {} ({:.1}°)",
            self.transit_planet.label(),
            self.aspect_type.label(),
            self.natal_planet.label(),
            self.orb_deviation
        )
    }
}
