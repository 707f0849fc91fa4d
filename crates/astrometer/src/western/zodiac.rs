//! Closed enumerations for the bodies and signs the engine scores.
//!
//! Identifiers (serde, lookups) and display labels are kept apart: the enums
//! serialize as lowercase ids, and `label()` reads from a separate table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

const PLANET_IDS: &[&str] = &[
    "sun", "moon", "mercury", "venus", "mars", "jupiter", "saturn", "uranus", "neptune", "pluto",
];

const PLANET_LABELS: &[&str] = &[
    "Sun", "Moon", "Mercury", "Venus", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune", "Pluto",
];

impl Planet {
    pub const ALL: [Planet; 10] = [
        Planet::Sun,
        Planet::Moon,
        Planet::Mercury,
        Planet::Venus,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        PLANET_IDS[self.index()]
    }

    pub fn label(self) -> &'static str {
        PLANET_LABELS[self.index()]
    }

    pub fn is_luminary(self) -> bool {
        matches!(self, Planet::Sun | Planet::Moon)
    }

    /// Uranus, Neptune and Pluto.
    pub fn is_transformational(self) -> bool {
        matches!(self, Planet::Uranus | Planet::Neptune | Planet::Pluto)
    }

    pub fn is_benefic(self) -> bool {
        matches!(self, Planet::Venus | Planet::Jupiter)
    }

    pub fn is_malefic(self) -> bool {
        matches!(self, Planet::Mars | Planet::Saturn)
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Planet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        PLANET_IDS
            .iter()
            .position(|id| *id == needle)
            .map(|i| Planet::ALL[i])
            .ok_or_else(|| format!("unknown planet '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

const SIGN_IDS: &[&str] = &[
    "aries", "taurus", "gemini", "cancer",
    "leo", "virgo", "libra", "scorpio",
    "sagittarius", "capricorn", "aquarius", "pisces",
];

const SIGN_LABELS: &[&str] = &[
    "Aries", "Taurus", "Gemini", "Cancer",
    "Leo", "Virgo", "Libra", "Scorpio",
    "Sagittarius", "Capricorn", "Aquarius", "Pisces",
];

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> ZodiacSign {
        ZodiacSign::ALL[index % 12]
    }

    /// Sign occupied by an ecliptic longitude in degrees.
    pub fn from_longitude(longitude: f64) -> ZodiacSign {
        let normalized = longitude.rem_euclid(360.0);
        ZodiacSign::from_index((normalized / 30.0) as usize)
    }

    pub fn id(self) -> &'static str {
        SIGN_IDS[self.index()]
    }

    pub fn label(self) -> &'static str {
        SIGN_LABELS[self.index()]
    }

    pub fn element(self) -> Element {
        match self.index() % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    pub fn modality(self) -> Modality {
        match self.index() % 3 {
            0 => Modality::Cardinal,
            1 => Modality::Fixed,
            _ => Modality::Mutable,
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ZodiacSign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        SIGN_IDS
            .iter()
            .position(|id| *id == needle)
            .map(ZodiacSign::from_index)
            .ok_or_else(|| format!("unknown sign '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

impl Element {
    pub fn label(self) -> &'static str {
        match self {
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Air => "Air",
            Element::Water => "Water",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Cardinal,
    Fixed,
    Mutable,
}

impl Modality {
    pub fn label(self) -> &'static str {
        match self {
            Modality::Cardinal => "Cardinal",
            Modality::Fixed => "Fixed",
            Modality::Mutable => "Mutable",
        }
    }
}
