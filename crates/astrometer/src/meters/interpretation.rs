//! Short text lookups keyed on meter and quality label.

use crate::meters::definitions::MeterId;
use crate::normalization::labels::QualityLabel;

/// What a meter is about, phrased to follow "Today's ...".
pub fn focus(meter: MeterId) -> &'static str {
    match meter {
        MeterId::OverallIntensity => "overall cosmic activity",
        MeterId::OverallHarmony => "overall cosmic weather",
        MeterId::MentalClarity => "thinking and focus",
        MeterId::DecisionQuality => "judgement and choices",
        MeterId::CommunicationFlow => "conversations and messages",
        MeterId::EmotionalIntensity => "emotional depth",
        MeterId::RelationshipHarmony => "close relationships",
        MeterId::EmotionalResilience => "emotional stamina",
        MeterId::PhysicalEnergy => "physical vitality",
        MeterId::ConflictRisk => "friction with others",
        MeterId::MotivationDrive => "drive and initiative",
        MeterId::IntuitionSpirituality => "intuition and inner life",
        MeterId::KarmicLessons => "long-running life lessons",
        MeterId::TransformationPressure => "pressure to change",
        MeterId::SocialCollective => "community and wider circles",
        MeterId::CareerAmbition => "work and ambition",
        MeterId::OpportunityWindow => "openings and luck",
        MeterId::InnovationBreakthrough => "new ideas and breakthroughs",
        MeterId::ChallengeIntensity => "obstacles and tests",
        MeterId::FireEnergy => "enthusiasm and courage",
        MeterId::EarthEnergy => "practical grounding",
        MeterId::AirEnergy => "ideas and social exchange",
        MeterId::WaterEnergy => "feelings and empathy",
    }
}

fn tone(quality: QualityLabel) -> &'static str {
    match quality {
        QualityLabel::Quiet => "is quiet, with little astrological emphasis",
        QualityLabel::Peaceful => "is calm and gently supported",
        QualityLabel::Harmonious => "is active and well supported",
        QualityLabel::Mixed => "is active with mixed signals",
        QualityLabel::Intense => "is highly charged and could swing either way",
        QualityLabel::Challenging => "is under strain",
    }
}

pub fn interpret(meter: MeterId, quality: QualityLabel) -> String {
    format!("{}: today's {} {}.", meter.label(), focus(meter), tone(quality))
}

pub fn advice(meter: MeterId, quality: QualityLabel) -> Vec<String> {
    let area = focus(meter);
    match quality {
        QualityLabel::Quiet => vec![format!("Routine suits {area} today."), "Use the lull to rest.".to_string()],
        QualityLabel::Peaceful => vec![format!("Lean into {area} without forcing it.")],
        QualityLabel::Harmonious => vec![
            format!("Act on {area} while the support lasts."),
            "Start what you have been postponing.".to_string(),
        ],
        QualityLabel::Mixed => vec![format!("Weigh options around {area} before committing.")],
        QualityLabel::Intense => vec![
            format!("Channel the charge in {area} into one clear goal."),
            "Avoid snap decisions.".to_string(),
        ],
        QualityLabel::Challenging => vec![
            format!("Go slowly with {area}."),
            "Keep commitments small and expectations realistic.".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpretation_mentions_meter() {
        let text = interpret(MeterId::CareerAmbition, QualityLabel::Challenging);
        assert!(text.starts_with("Career Ambition:"));
        assert!(text.contains("under strain"));
        assert!(!advice(MeterId::CareerAmbition, QualityLabel::Challenging).is_empty());
    }
}
