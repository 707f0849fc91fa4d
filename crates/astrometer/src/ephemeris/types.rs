use crate::error::{AstrometerError, Result};
use crate::western::zodiac::{Element, Modality, Planet, ZodiacSign};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Planetary position data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub name: Planet,
    pub sign: ZodiacSign,
    /// House (1-12)
    pub house: u8,
    /// Degrees within the sign (0-30)
    pub degree_in_sign: f64,
    /// Longitude in degrees (0-360)
    pub absolute_degree: f64,
    /// Speed in longitude (degrees per day)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Whether the planet is retrograde
    #[serde(default)]
    pub retrograde: bool,
    /// Days to (or since) the nearest station, when the ephemeris supplies it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_from_station: Option<f64>,
}

impl PlanetPosition {
    /// Build a position from a longitude, deriving sign and degree.
    pub fn at_longitude(name: Planet, absolute_degree: f64, house: u8, speed: Option<f64>) -> Self {
        let absolute_degree = absolute_degree.rem_euclid(360.0);
        Self {
            name,
            sign: ZodiacSign::from_longitude(absolute_degree),
            house,
            degree_in_sign: absolute_degree % 30.0,
            absolute_degree,
            speed,
            retrograde: speed.map(|s| s < 0.0).unwrap_or(false),
            days_from_station: None,
        }
    }

    pub fn element(&self) -> Element {
        self.sign.element()
    }

    pub fn modality(&self) -> Modality {
        self.sign.modality()
    }
}

/// House cusp position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseCusp {
    pub number: u8,
    pub sign: ZodiacSign,
    pub absolute_degree: f64,
}

/// Chart angles as ecliptic longitudes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Angles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascendant: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midheaven: Option<f64>,
}

/// Validated chart as consumed by the scoring core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub planets: Vec<PlanetPosition>,
    #[serde(default)]
    pub houses: Vec<HouseCusp>,
    #[serde(default)]
    pub angles: Angles,
}

// Loosely typed mirror of the ephemeris payload. Everything is checked in
// `RawChart::into_chart` before the core sees it.

#[derive(Debug, Deserialize)]
struct RawPlanet {
    name: String,
    sign: String,
    house: i64,
    degree_in_sign: f64,
    absolute_degree: f64,
    #[serde(default)]
    speed: Option<f64>,
    #[serde(default)]
    retrograde: Option<bool>,
    #[serde(default)]
    days_from_station: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawHouse {
    number: i64,
    sign: String,
    #[serde(alias = "degree")]
    absolute_degree: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAngle {
    Longitude(f64),
    Detailed { absolute_degree: f64 },
}

impl RawAngle {
    fn longitude(&self) -> f64 {
        match self {
            RawAngle::Longitude(lon) => *lon,
            RawAngle::Detailed { absolute_degree } => *absolute_degree,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawAngles {
    #[serde(default)]
    ascendant: Option<RawAngle>,
    #[serde(default, alias = "mc")]
    midheaven: Option<RawAngle>,
}

#[derive(Debug, Deserialize)]
struct RawChart {
    planets: Vec<RawPlanet>,
    #[serde(default)]
    houses: Vec<RawHouse>,
    #[serde(default)]
    angles: RawAngles,
}

impl RawChart {
    fn into_chart(self) -> Result<ChartData> {
        let mut planets = Vec::with_capacity(self.planets.len());
        for raw in self.planets {
            let name = match raw.name.parse::<Planet>() {
                Ok(planet) => planet,
                Err(_) => {
                    // Nodes, Chiron, asteroids: present in ephemeris output, not scored
                    log::debug!("skipping unscored body '{}'", raw.name);
                    continue;
                }
            };
            let sign = raw
                .sign
                .parse::<ZodiacSign>()
                .map_err(|e| AstrometerError::InvalidChart(format!("{}: {e}", name.id())))?;
            let house = u8::try_from(raw.house).map_err(|_| {
                AstrometerError::InvalidChart(format!("{}: house {} out of range", name.id(), raw.house))
            })?;
            planets.push(PlanetPosition {
                name,
                sign,
                house,
                degree_in_sign: raw.degree_in_sign,
                absolute_degree: raw.absolute_degree,
                speed: raw.speed,
                retrograde: raw.retrograde.unwrap_or_else(|| raw.speed.map(|s| s < 0.0).unwrap_or(false)),
                days_from_station: raw.days_from_station,
            });
        }

        let mut houses = Vec::with_capacity(self.houses.len());
        for raw in self.houses {
            let number = u8::try_from(raw.number)
                .map_err(|_| AstrometerError::InvalidChart(format!("house number {} out of range", raw.number)))?;
            let sign = raw
                .sign
                .parse::<ZodiacSign>()
                .map_err(|e| AstrometerError::InvalidChart(format!("house {number}: {e}")))?;
            houses.push(HouseCusp { number, sign, absolute_degree: raw.absolute_degree });
        }

        let angles = Angles {
            ascendant: self.angles.ascendant.as_ref().map(RawAngle::longitude),
            midheaven: self.angles.midheaven.as_ref().map(RawAngle::longitude),
        };

        let chart = ChartData { planets, houses, angles };
        chart.validate()?;
        Ok(chart)
    }
}

/// Allowed disagreement between `degree_in_sign` and the longitude.
pub const DEGREE_TOLERANCE: f64 = 0.01;

fn invalid(message: String) -> AstrometerError {
    AstrometerError::InvalidChart(message)
}

impl ChartData {
    pub fn new(planets: Vec<PlanetPosition>, ascendant: Option<f64>) -> Result<Self> {
        let chart = Self {
            planets,
            houses: Vec::new(),
            angles: Angles { ascendant, midheaven: None },
        };
        chart.validate()?;
        Ok(chart)
    }

    /// Parse and validate an ephemeris chart payload.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawChart = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
        raw.into_chart()
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawChart = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
        raw.into_chart()
    }

    /// Check the structural invariants the scoring core relies on.
    pub fn validate(&self) -> Result<()> {
        if self.planets.is_empty() {
            return Err(invalid("chart has no scorable planets".to_string()));
        }
        let mut seen = [false; 10];
        for p in &self.planets {
            let id = p.name.id();
            if seen[p.name.index()] {
                return Err(invalid(format!("duplicate planet '{id}'")));
            }
            seen[p.name.index()] = true;

            if !(1..=12).contains(&p.house) {
                return Err(invalid(format!("{id}: house {} out of range 1-12", p.house)));
            }
            if !p.degree_in_sign.is_finite() || !(0.0..30.0).contains(&p.degree_in_sign) {
                return Err(invalid(format!("{id}: degree_in_sign {} out of range", p.degree_in_sign)));
            }
            if !p.absolute_degree.is_finite() || !(0.0..360.0).contains(&p.absolute_degree) {
                return Err(invalid(format!("{id}: absolute_degree {} out of range", p.absolute_degree)));
            }
            if ZodiacSign::from_longitude(p.absolute_degree) != p.sign {
                return Err(invalid(format!(
                    "{id}: sign {} does not match longitude {:.3}",
                    p.sign.id(),
                    p.absolute_degree
                )));
            }
            let expected = p.absolute_degree % 30.0;
            let drift = (p.degree_in_sign - expected).abs();
            if drift.min(30.0 - drift) > DEGREE_TOLERANCE {
                return Err(invalid(format!(
                    "{id}: degree_in_sign {:.3} does not match longitude {:.3}",
                    p.degree_in_sign, p.absolute_degree
                )));
            }
            if let Some(speed) = p.speed {
                if !speed.is_finite() {
                    return Err(invalid(format!("{id}: speed is not finite")));
                }
            }
        }
        for h in &self.houses {
            if !(1..=12).contains(&h.number) {
                return Err(invalid(format!("house number {} out of range", h.number)));
            }
        }
        if let Some(asc) = self.angles.ascendant {
            if !asc.is_finite() {
                return Err(invalid("ascendant is not finite".to_string()));
            }
        }
        Ok(())
    }

    pub fn planet(&self, name: Planet) -> Option<&PlanetPosition> {
        self.planets.iter().find(|p| p.name == name)
    }

    /// Ascendant sign from the angles, falling back to the first house cusp.
    pub fn ascendant_sign(&self) -> Option<ZodiacSign> {
        self.angles
            .ascendant
            .map(ZodiacSign::from_longitude)
            .or_else(|| self.houses.iter().find(|h| h.number == 1).map(|h| h.sign))
    }

    /// Process-independent 64-bit fingerprint of the planet placements.
    pub fn fingerprint(&self) -> u64 {
        let mut placements: Vec<&PlanetPosition> = self.planets.iter().collect();
        placements.sort_by_key(|p| p.name);

        let mut hasher = Sha256::new();
        for p in placements {
            hasher.update(format!("{}:{:.6}:{}|", p.name.id(), p.absolute_degree, p.house).as_bytes());
        }
        if let Some(asc) = self.angles.ascendant {
            hasher.update(format!("asc:{asc:.6}").as_bytes());
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "planets": [
            {"name": "Sun", "sign": "leo", "house": 10, "degree_in_sign": 15.0,
             "absolute_degree": 135.0, "speed": 0.98, "retrograde": false,
             "element": "fire", "modality": "fixed"},
            {"name": "north node", "sign": "aries", "house": 6, "degree_in_sign": 2.0,
             "absolute_degree": 2.0, "speed": -0.05}
        ],
        "houses": [{"number": 1, "sign": "leo", "absolute_degree": 121.0}],
        "angles": {"ascendant": {"sign": "leo", "absolute_degree": 121.0}},
        "distributions": {"elements": {"fire": 1}}
    }"#;

    #[test]
    fn test_parse_skips_unscored_bodies() {
        let chart = ChartData::from_json(SAMPLE).unwrap();
        assert_eq!(chart.planets.len(), 1);
        assert_eq!(chart.planets[0].name, Planet::Sun);
        assert_eq!(chart.ascendant_sign(), Some(ZodiacSign::Leo));
    }

    #[test]
    fn test_rejects_bad_house() {
        let json = SAMPLE.replace("\"house\": 10", "\"house\": 13");
        let err = ChartData::from_json(&json).unwrap_err();
        assert!(matches!(err, AstrometerError::InvalidChart(_)));
    }

    #[test]
    fn test_rejects_sign_longitude_mismatch() {
        let json = SAMPLE.replace("\"sign\": \"leo\", \"house\": 10", "\"sign\": \"virgo\", \"house\": 10");
        assert!(ChartData::from_json(&json).is_err());
    }

    #[test]
    fn test_rejects_degree_longitude_mismatch() {
        // Sun at 135° is 15° Leo
        let json = SAMPLE.replace("\"degree_in_sign\": 15.0", "\"degree_in_sign\": 20.0");
        let err = ChartData::from_json(&json).unwrap_err();
        assert!(matches!(err, AstrometerError::InvalidChart(ref m) if m.contains("degree_in_sign")));

        let close = SAMPLE.replace("\"degree_in_sign\": 15.0", "\"degree_in_sign\": 15.004");
        assert!(ChartData::from_json(&close).is_ok());
    }

    #[test]
    fn test_fingerprint_is_stable_and_order_independent() {
        let a = ChartData::new(
            vec![
                PlanetPosition::at_longitude(Planet::Sun, 135.0, 10, Some(1.0)),
                PlanetPosition::at_longitude(Planet::Moon, 20.0, 6, Some(13.0)),
            ],
            Some(121.0),
        )
        .unwrap();
        let mut b = a.clone();
        b.planets.reverse();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = a.clone();
        c.planets[0] = PlanetPosition::at_longitude(Planet::Sun, 136.0, 10, Some(1.0));
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
