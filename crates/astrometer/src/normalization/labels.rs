//! Threshold lookups from normalized scores to labels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLabel {
    Quiet,
    Mild,
    Moderate,
    High,
    Extreme,
}

impl IntensityLabel {
    pub fn from_score(intensity: f64) -> Self {
        if intensity < 30.0 {
            IntensityLabel::Quiet
        } else if intensity < 50.0 {
            IntensityLabel::Mild
        } else if intensity < 70.0 {
            IntensityLabel::Moderate
        } else if intensity < 85.0 {
            IntensityLabel::High
        } else {
            IntensityLabel::Extreme
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntensityLabel::Quiet => "Quiet",
            IntensityLabel::Mild => "Mild",
            IntensityLabel::Moderate => "Moderate",
            IntensityLabel::High => "High",
            IntensityLabel::Extreme => "Extreme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonyLabel {
    Challenging,
    Mixed,
    Harmonious,
}

impl HarmonyLabel {
    pub fn from_score(harmony: f64) -> Self {
        if harmony < 30.0 {
            HarmonyLabel::Challenging
        } else if harmony < 70.0 {
            HarmonyLabel::Mixed
        } else {
            HarmonyLabel::Harmonious
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HarmonyLabel::Challenging => "Challenging",
            HarmonyLabel::Mixed => "Mixed",
            HarmonyLabel::Harmonious => "Harmonious",
        }
    }
}

/// Combined reading of how much is happening and how it feels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLabel {
    Quiet,
    Peaceful,
    Harmonious,
    Mixed,
    Intense,
    Challenging,
}

impl QualityLabel {
    pub fn from_scores(intensity: f64, harmony: f64) -> Self {
        let harmony_label = HarmonyLabel::from_score(harmony);
        if IntensityLabel::from_score(intensity) == IntensityLabel::Quiet {
            return match harmony_label {
                HarmonyLabel::Harmonious => QualityLabel::Peaceful,
                _ => QualityLabel::Quiet,
            };
        }
        match harmony_label {
            HarmonyLabel::Harmonious => QualityLabel::Harmonious,
            HarmonyLabel::Challenging => QualityLabel::Challenging,
            HarmonyLabel::Mixed if intensity >= 85.0 => QualityLabel::Intense,
            HarmonyLabel::Mixed => QualityLabel::Mixed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityLabel::Quiet => "Quiet",
            QualityLabel::Peaceful => "Peaceful",
            QualityLabel::Harmonious => "Harmonious",
            QualityLabel::Mixed => "Mixed",
            QualityLabel::Intense => "Intense",
            QualityLabel::Challenging => "Challenging",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_cut_points() {
        assert_eq!(IntensityLabel::from_score(0.0), IntensityLabel::Quiet);
        assert_eq!(IntensityLabel::from_score(29.9), IntensityLabel::Quiet);
        assert_eq!(IntensityLabel::from_score(30.0), IntensityLabel::Mild);
        assert_eq!(IntensityLabel::from_score(50.0), IntensityLabel::Moderate);
        assert_eq!(IntensityLabel::from_score(70.0), IntensityLabel::High);
        assert_eq!(IntensityLabel::from_score(85.0), IntensityLabel::Extreme);
    }

    #[test]
    fn test_harmony_cut_points() {
        assert_eq!(HarmonyLabel::from_score(29.0), HarmonyLabel::Challenging);
        assert_eq!(HarmonyLabel::from_score(50.0), HarmonyLabel::Mixed);
        assert_eq!(HarmonyLabel::from_score(70.0), HarmonyLabel::Harmonious);
    }

    #[test]
    fn test_quality_combines_both_axes() {
        assert_eq!(QualityLabel::from_scores(10.0, 50.0), QualityLabel::Quiet);
        assert_eq!(QualityLabel::from_scores(10.0, 90.0), QualityLabel::Peaceful);
        assert_eq!(QualityLabel::from_scores(60.0, 20.0), QualityLabel::Challenging);
        assert_eq!(QualityLabel::from_scores(90.0, 50.0), QualityLabel::Intense);
        assert_eq!(QualityLabel::from_scores(60.0, 50.0), QualityLabel::Mixed);
    }
}
