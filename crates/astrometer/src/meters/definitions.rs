//! The 23 meters and the aspect filter behind each one.

use crate::aspects::types::{AspectType, TransitAspect};
use crate::error::AstrometerError;
use crate::western::zodiac::{Element, Planet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use AspectType::*;
use Planet::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterId {
    OverallIntensity,
    OverallHarmony,
    MentalClarity,
    DecisionQuality,
    CommunicationFlow,
    EmotionalIntensity,
    RelationshipHarmony,
    EmotionalResilience,
    PhysicalEnergy,
    ConflictRisk,
    MotivationDrive,
    IntuitionSpirituality,
    KarmicLessons,
    TransformationPressure,
    SocialCollective,
    CareerAmbition,
    OpportunityWindow,
    InnovationBreakthrough,
    ChallengeIntensity,
    FireEnergy,
    EarthEnergy,
    AirEnergy,
    WaterEnergy,
}

const METER_IDS: &[&str] = &[
    "overall_intensity",
    "overall_harmony",
    "mental_clarity",
    "decision_quality",
    "communication_flow",
    "emotional_intensity",
    "relationship_harmony",
    "emotional_resilience",
    "physical_energy",
    "conflict_risk",
    "motivation_drive",
    "intuition_spirituality",
    "karmic_lessons",
    "transformation_pressure",
    "social_collective",
    "career_ambition",
    "opportunity_window",
    "innovation_breakthrough",
    "challenge_intensity",
    "fire_energy",
    "earth_energy",
    "air_energy",
    "water_energy",
];

const METER_LABELS: &[&str] = &[
    "Overall Intensity",
    "Overall Harmony",
    "Mental Clarity",
    "Decision Quality",
    "Communication Flow",
    "Emotional Intensity",
    "Relationship Harmony",
    "Emotional Resilience",
    "Physical Energy",
    "Conflict Risk",
    "Motivation Drive",
    "Intuition & Spirituality",
    "Karmic Lessons",
    "Transformation Pressure",
    "Social & Collective",
    "Career Ambition",
    "Opportunity Window",
    "Innovation & Breakthrough",
    "Challenge Intensity",
    "Fire Energy",
    "Earth Energy",
    "Air Energy",
    "Water Energy",
];

impl MeterId {
    pub const ALL: [MeterId; 23] = [
        MeterId::OverallIntensity,
        MeterId::OverallHarmony,
        MeterId::MentalClarity,
        MeterId::DecisionQuality,
        MeterId::CommunicationFlow,
        MeterId::EmotionalIntensity,
        MeterId::RelationshipHarmony,
        MeterId::EmotionalResilience,
        MeterId::PhysicalEnergy,
        MeterId::ConflictRisk,
        MeterId::MotivationDrive,
        MeterId::IntuitionSpirituality,
        MeterId::KarmicLessons,
        MeterId::TransformationPressure,
        MeterId::SocialCollective,
        MeterId::CareerAmbition,
        MeterId::OpportunityWindow,
        MeterId::InnovationBreakthrough,
        MeterId::ChallengeIntensity,
        MeterId::FireEnergy,
        MeterId::EarthEnergy,
        MeterId::AirEnergy,
        MeterId::WaterEnergy,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        METER_IDS[self.index()]
    }

    pub fn label(self) -> &'static str {
        METER_LABELS[self.index()]
    }

    pub fn is_overall(self) -> bool {
        matches!(self, MeterId::OverallIntensity | MeterId::OverallHarmony)
    }

    /// Life-area group; overall and element meters have none.
    pub fn group(self) -> Option<MeterGroup> {
        MeterGroup::ALL.into_iter().find(|g| g.members().contains(&self))
    }

    /// Aspect filter for this meter.
    ///
    /// Apart from the two overall meters no aspect passes more than one
    /// filter. Life-area meters each own one transit planet with either its
    /// sextiles and squares or its trines, oppositions and quincunxes.
    /// Conjunctions put the transiting planet in the natal planet's sign and go
    /// to the element meter of that sign.
    pub fn definition(self) -> MeterDefinition {
        let rule = |natal: NatalSelector, transit: &'static [Planet], aspects: &'static [AspectType]| {
            MeterDefinition::new(self, natal, transit, aspects)
        };
        match self {
            MeterId::OverallIntensity | MeterId::OverallHarmony => rule(NatalSelector::All, NONE, ANY_ASPECT),
            MeterId::MentalClarity => rule(points(&[Mercury], &[3]), &[Mercury], SEXTILE_SQUARE),
            MeterId::DecisionQuality => rule(points(&[Mercury, Jupiter, Saturn], &[9, 10]), &[Jupiter], SEXTILE_SQUARE),
            MeterId::CommunicationFlow => rule(points(&[Mercury, Venus], &[3, 7]), &[Mercury], TRINE_OPPOSITION),
            MeterId::EmotionalIntensity => rule(points(&[Moon, Pluto], &[4, 8]), &[Moon], SEXTILE_SQUARE),
            MeterId::RelationshipHarmony => rule(points(&[Venus], &[7]), &[Venus], NOT_CONJUNCTION),
            MeterId::EmotionalResilience => rule(points(&[Moon, Saturn], &[4, 12]), &[Moon], TRINE_OPPOSITION),
            MeterId::PhysicalEnergy => rule(points(&[Sun, Mars], &[1, 6]), &[Mars], TRINE_OPPOSITION),
            MeterId::ConflictRisk => rule(points(&[Mars], &[1, 7]), &[Mars], SEXTILE_SQUARE),
            MeterId::MotivationDrive => rule(points(&[Mars, Sun, Jupiter], &[1, 10]), &[Sun], SEXTILE_SQUARE),
            MeterId::IntuitionSpirituality => rule(points(&[Moon, Neptune], &[12]), &[Neptune], NOT_CONJUNCTION),
            MeterId::KarmicLessons => rule(points(&[Saturn], &[8, 12]), &[Saturn], TRINE_OPPOSITION),
            MeterId::TransformationPressure => rule(points(&[Pluto, Sun], &[8]), &[Pluto], NOT_CONJUNCTION),
            MeterId::SocialCollective => rule(points(&[Jupiter, Uranus], &[11]), &[Uranus], TRINE_OPPOSITION),
            MeterId::CareerAmbition => rule(points(&[Sun, Saturn], &[10]), &[Sun], TRINE_OPPOSITION),
            MeterId::OpportunityWindow => rule(points(&[Jupiter, Venus, Sun], &[2, 9, 11]), &[Jupiter], TRINE_OPPOSITION),
            MeterId::InnovationBreakthrough => rule(points(&[Uranus, Mercury], &[11]), &[Uranus], SEXTILE_SQUARE),
            MeterId::ChallengeIntensity => rule(NatalSelector::All, &[Saturn], SEXTILE_SQUARE),
            MeterId::FireEnergy => rule(NatalSelector::Element(Element::Fire), NONE, CONJUNCTION),
            MeterId::EarthEnergy => rule(NatalSelector::Element(Element::Earth), NONE, CONJUNCTION),
            MeterId::AirEnergy => rule(NatalSelector::Element(Element::Air), NONE, CONJUNCTION),
            MeterId::WaterEnergy => rule(NatalSelector::Element(Element::Water), NONE, CONJUNCTION),
        }
    }
}

impl fmt::Display for MeterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for MeterId {
    type Err = AstrometerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        METER_IDS
            .iter()
            .position(|id| *id == needle)
            .map(|i| MeterId::ALL[i])
            .ok_or_else(|| AstrometerError::UnknownMeter(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterGroup {
    Mind,
    Heart,
    Body,
    Instincts,
    Growth,
}

impl MeterGroup {
    pub const ALL: [MeterGroup; 5] =
        [MeterGroup::Mind, MeterGroup::Heart, MeterGroup::Body, MeterGroup::Instincts, MeterGroup::Growth];

    pub fn label(self) -> &'static str {
        match self {
            MeterGroup::Mind => "Mind",
            MeterGroup::Heart => "Heart",
            MeterGroup::Body => "Body",
            MeterGroup::Instincts => "Instincts",
            MeterGroup::Growth => "Growth",
        }
    }

    pub fn members(self) -> &'static [MeterId] {
        match self {
            MeterGroup::Mind => &[MeterId::MentalClarity, MeterId::DecisionQuality, MeterId::CommunicationFlow],
            MeterGroup::Heart => {
                &[MeterId::EmotionalIntensity, MeterId::RelationshipHarmony, MeterId::EmotionalResilience]
            }
            MeterGroup::Body => &[MeterId::PhysicalEnergy, MeterId::ConflictRisk, MeterId::MotivationDrive],
            MeterGroup::Instincts => &[
                MeterId::IntuitionSpirituality,
                MeterId::KarmicLessons,
                MeterId::TransformationPressure,
                MeterId::SocialCollective,
            ],
            MeterGroup::Growth => &[
                MeterId::CareerAmbition,
                MeterId::OpportunityWindow,
                MeterId::InnovationBreakthrough,
                MeterId::ChallengeIntensity,
            ],
        }
    }
}

const NONE: &[Planet] = &[];
const ANY_ASPECT: &[AspectType] = &[];
const CONJUNCTION: &[AspectType] = &[Conjunction];
const SEXTILE_SQUARE: &[AspectType] = &[Sextile, Square];
const TRINE_OPPOSITION: &[AspectType] = &[Trine, Opposition, Quincunx];
const NOT_CONJUNCTION: &[AspectType] = &[Sextile, Square, Trine, Quincunx, Opposition];

const fn points(planets: &'static [Planet], houses: &'static [u8]) -> NatalSelector {
    NatalSelector::Points { planets, houses }
}

/// Which natal side of an aspect a meter listens to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NatalSelector {
    All,
    /// Natal planet in the list, or natal planet in one of the houses
    Points { planets: &'static [Planet], houses: &'static [u8] },
    /// Natal planet sits in a sign of this element
    Element(Element),
}

impl NatalSelector {
    fn matches(&self, aspect: &TransitAspect) -> bool {
        match self {
            NatalSelector::All => true,
            NatalSelector::Points { planets, houses } => {
                planets.contains(&aspect.natal_planet) || houses.contains(&aspect.natal_house)
            }
            NatalSelector::Element(element) => aspect.natal_sign.element() == *element,
        }
    }
}

/// Aspect filter for one meter. Empty transit or aspect lists accept any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterDefinition {
    pub meter: MeterId,
    pub natal: NatalSelector,
    pub transit_planets: &'static [Planet],
    pub aspect_types: &'static [AspectType],
}

impl MeterDefinition {
    pub fn new(
        meter: MeterId,
        natal: NatalSelector,
        transit_planets: &'static [Planet],
        aspect_types: &'static [AspectType],
    ) -> Self {
        Self { meter, natal, transit_planets, aspect_types }
    }

    pub fn matches(&self, aspect: &TransitAspect) -> bool {
        self.natal.matches(aspect)
            && (self.transit_planets.is_empty() || self.transit_planets.contains(&aspect.transit_planet))
            && (self.aspect_types.is_empty() || self.aspect_types.contains(&aspect.aspect_type))
    }

    pub fn filter(&self, aspects: &[TransitAspect]) -> Vec<TransitAspect> {
        aspects.iter().filter(|a| self.matches(a)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::western::zodiac::ZodiacSign;

    fn aspect(natal: Planet, sign: ZodiacSign, house: u8, transit: Planet, kind: AspectType) -> TransitAspect {
        TransitAspect::new(natal, sign, house, transit, kind, 1.0, 8.0)
    }

    #[test]
    fn test_ids_round_trip() {
        assert_eq!(MeterId::ALL.len(), 23);
        for meter in MeterId::ALL {
            assert_eq!(meter.id().parse::<MeterId>().unwrap(), meter);
            assert_eq!(serde_json::to_value(meter).unwrap(), meter.id());
        }
        assert!(matches!("vibes".parse::<MeterId>(), Err(AstrometerError::UnknownMeter(_))));
    }

    #[test]
    fn test_groups_partition_life_area_meters() {
        let grouped: usize = MeterGroup::ALL.iter().map(|g| g.members().len()).sum();
        assert_eq!(grouped, 17);
        assert_eq!(MeterId::MentalClarity.group(), Some(MeterGroup::Mind));
        assert_eq!(MeterId::ChallengeIntensity.group(), Some(MeterGroup::Growth));
        assert_eq!(MeterId::FireEnergy.group(), None);
        assert_eq!(MeterId::OverallHarmony.group(), None);
    }

    #[test]
    fn test_natal_planet_or_house() {
        let def = MeterId::MentalClarity.definition();
        assert!(def.matches(&aspect(Mercury, ZodiacSign::Gemini, 7, Mercury, Square)));
        assert!(def.matches(&aspect(Venus, ZodiacSign::Gemini, 3, Mercury, Sextile)));
        assert!(!def.matches(&aspect(Venus, ZodiacSign::Gemini, 4, Mercury, Square)));
        assert!(!def.matches(&aspect(Mercury, ZodiacSign::Gemini, 7, Saturn, Square)));
    }

    #[test]
    fn test_transit_and_aspect_restrictions() {
        let def = MeterId::ChallengeIntensity.definition();
        assert!(def.matches(&aspect(Venus, ZodiacSign::Leo, 5, Saturn, Square)));
        assert!(!def.matches(&aspect(Venus, ZodiacSign::Leo, 5, Saturn, Trine)));
        assert!(!def.matches(&aspect(Venus, ZodiacSign::Leo, 5, Jupiter, Square)));

        let conflict = MeterId::ConflictRisk.definition();
        assert!(conflict.matches(&aspect(Mars, ZodiacSign::Aries, 5, Mars, Square)));
        assert!(!conflict.matches(&aspect(Mars, ZodiacSign::Aries, 5, Mars, Trine)));
        assert!(MeterId::PhysicalEnergy.definition().matches(&aspect(Mars, ZodiacSign::Aries, 5, Mars, Trine)));
    }

    #[test]
    fn test_element_meters_use_natal_sign() {
        let fire = MeterId::FireEnergy.definition();
        assert!(fire.matches(&aspect(Moon, ZodiacSign::Sagittarius, 2, Venus, Conjunction)));
        assert!(!fire.matches(&aspect(Moon, ZodiacSign::Pisces, 2, Venus, Conjunction)));
        assert!(!fire.matches(&aspect(Moon, ZodiacSign::Sagittarius, 2, Venus, Sextile)));
        assert!(MeterId::WaterEnergy.definition().matches(&aspect(Moon, ZodiacSign::Pisces, 2, Venus, Conjunction)));
    }

    #[test]
    fn test_no_aspect_feeds_two_meters() {
        let definitions: Vec<MeterDefinition> =
            MeterId::ALL.into_iter().filter(|m| !m.is_overall()).map(MeterId::definition).collect();
        assert_eq!(definitions.len(), 21);

        for natal in Planet::ALL {
            for sign in ZodiacSign::ALL {
                for house in 1..=12 {
                    for transit in Planet::ALL {
                        for kind in AspectType::ALL {
                            let a = aspect(natal, sign, house, transit, kind);
                            let owners: Vec<MeterId> =
                                definitions.iter().filter(|d| d.matches(&a)).map(|d| d.meter).collect();
                            assert!(owners.len() <= 1, "{} feeds {:?}", a.describe(), owners);
                            if kind == Conjunction {
                                assert_eq!(owners.len(), 1, "{} has no element meter", a.describe());
                            }
                        }
                    }
                }
            }
        }
    }
}
