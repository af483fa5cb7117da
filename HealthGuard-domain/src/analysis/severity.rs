//! Hemoglobin interpretation
//!
//! Maps a predicted hemoglobin concentration (g/L) and the patient's sex to
//! an anemia severity band and the advisory message shown to the user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::error::AnalysisError;

/// Biological sex, which shifts the mild/normal/elevated thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// Single-letter storage code
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

impl FromStr for Sex {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" | "homme" => Ok(Sex::Male),
            "f" | "female" | "femme" => Ok(Sex::Female),
            _ => Err(AnalysisError::InvalidSex(s.to_string())),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Anemia severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SeverityBand {
    Severe,
    Moderate,
    Mild,
    Normal,
    Elevated,
}

impl SeverityBand {
    /// Advisory message returned to the user and stored in history
    pub fn message(&self) -> &'static str {
        match self {
            SeverityBand::Severe => "Severe anemia detected, urgent medical consultation recommended",
            SeverityBand::Moderate => "Moderate anemia detected, prompt medical consultation recommended",
            SeverityBand::Mild => "Mild anemia detected, monitoring and medical consultation advised",
            SeverityBand::Normal => "Normal hemoglobin level, keep maintaining a balanced diet",
            SeverityBand::Elevated => {
                "Elevated hemoglobin level, medical consultation advised for verification"
            }
        }
    }

    pub fn status(&self) -> AnemiaStatus {
        match self {
            SeverityBand::Severe | SeverityBand::Moderate | SeverityBand::Mild => AnemiaStatus::Anemia,
            SeverityBand::Normal => AnemiaStatus::Normal,
            SeverityBand::Elevated => AnemiaStatus::Elevated,
        }
    }
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeverityBand::Severe => "severe",
            SeverityBand::Moderate => "moderate",
            SeverityBand::Mild => "mild",
            SeverityBand::Normal => "normal",
            SeverityBand::Elevated => "elevated",
        };
        f.write_str(name)
    }
}

/// Coarse status derived from the severity band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AnemiaStatus {
    Anemia,
    Normal,
    Elevated,
}

/// Full interpretation of one hemoglobin prediction
#[derive(Debug, Clone, PartialEq)]
pub struct AnemiaAssessment {
    /// Predicted hemoglobin in g/L
    pub hb_g_per_l: f32,
    pub band: SeverityBand,
    pub status: AnemiaStatus,
    pub message: String,
    /// Display form, e.g. "132.4 g/L"
    pub hb_level: String,
}

/// Classify a hemoglobin value.
///
/// | band     | male            | female          |
/// |----------|-----------------|-----------------|
/// | severe   | hb < 80         | hb < 80         |
/// | moderate | 80 <= hb < 100  | 80 <= hb < 100  |
/// | mild     | 100 <= hb < 130 | 100 <= hb < 120 |
/// | normal   | 130 <= hb <= 170| 120 <= hb <= 160|
/// | elevated | hb > 170        | hb > 160        |
pub fn classify_hemoglobin(hb_g_per_l: f32, sex: Sex) -> SeverityBand {
    let (normal_low, normal_high) = match sex {
        Sex::Male => (130.0, 170.0),
        Sex::Female => (120.0, 160.0),
    };

    if hb_g_per_l < 80.0 {
        SeverityBand::Severe
    } else if hb_g_per_l < 100.0 {
        SeverityBand::Moderate
    } else if hb_g_per_l < normal_low {
        SeverityBand::Mild
    } else if hb_g_per_l <= normal_high {
        SeverityBand::Normal
    } else {
        SeverityBand::Elevated
    }
}

pub fn interpret_hemoglobin(hb_g_per_l: f32, sex: Sex) -> AnemiaAssessment {
    let band = classify_hemoglobin(hb_g_per_l, sex);
    AnemiaAssessment {
        hb_g_per_l,
        band,
        status: band.status(),
        message: band.message().to_string(),
        hb_level: format!("{:.1} g/L", hb_g_per_l),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries_male() {
        assert_eq!(classify_hemoglobin(79.9, Sex::Male), SeverityBand::Severe);
        assert_eq!(classify_hemoglobin(80.0, Sex::Male), SeverityBand::Moderate);
        assert_eq!(classify_hemoglobin(99.9, Sex::Male), SeverityBand::Moderate);
        assert_eq!(classify_hemoglobin(100.0, Sex::Male), SeverityBand::Mild);
        assert_eq!(classify_hemoglobin(129.9, Sex::Male), SeverityBand::Mild);
        assert_eq!(classify_hemoglobin(130.0, Sex::Male), SeverityBand::Normal);
        assert_eq!(classify_hemoglobin(170.0, Sex::Male), SeverityBand::Normal);
        assert_eq!(classify_hemoglobin(170.1, Sex::Male), SeverityBand::Elevated);
    }

    #[test]
    fn test_band_boundaries_female() {
        assert_eq!(classify_hemoglobin(79.9, Sex::Female), SeverityBand::Severe);
        assert_eq!(classify_hemoglobin(80.0, Sex::Female), SeverityBand::Moderate);
        assert_eq!(classify_hemoglobin(100.0, Sex::Female), SeverityBand::Mild);
        assert_eq!(classify_hemoglobin(119.9, Sex::Female), SeverityBand::Mild);
        assert_eq!(classify_hemoglobin(120.0, Sex::Female), SeverityBand::Normal);
        assert_eq!(classify_hemoglobin(160.0, Sex::Female), SeverityBand::Normal);
        assert_eq!(classify_hemoglobin(160.1, Sex::Female), SeverityBand::Elevated);
    }

    #[test]
    fn test_same_value_differs_by_sex() {
        assert_eq!(classify_hemoglobin(125.0, Sex::Male), SeverityBand::Mild);
        assert_eq!(classify_hemoglobin(125.0, Sex::Female), SeverityBand::Normal);
        assert_eq!(classify_hemoglobin(165.0, Sex::Male), SeverityBand::Normal);
        assert_eq!(classify_hemoglobin(165.0, Sex::Female), SeverityBand::Elevated);
    }

    #[test]
    fn test_severity_never_increases_with_hemoglobin() {
        for sex in [Sex::Male, Sex::Female] {
            let mut previous = classify_hemoglobin(0.0, sex);
            for step in 1..=2500 {
                let hb = step as f32 / 10.0;
                let band = classify_hemoglobin(hb, sex);
                assert!(
                    band >= previous,
                    "band went from {} to {} at {} g/L for {}",
                    previous, band, hb, sex
                );
                previous = band;
            }
            assert_eq!(previous, SeverityBand::Elevated);
        }
    }

    #[test]
    fn test_interpret_formats_level_and_message() {
        let assessment = interpret_hemoglobin(132.44, Sex::Male);
        assert_eq!(assessment.band, SeverityBand::Normal);
        assert_eq!(assessment.status, AnemiaStatus::Normal);
        assert_eq!(assessment.hb_level, "132.4 g/L");
        assert_eq!(
            assessment.message,
            "Normal hemoglobin level, keep maintaining a balanced diet"
        );

        let severe = interpret_hemoglobin(61.0, Sex::Female);
        assert_eq!(severe.status, AnemiaStatus::Anemia);
        assert_eq!(severe.hb_level, "61.0 g/L");
        assert!(severe.message.starts_with("Severe anemia"));
    }

    #[test]
    fn test_status_per_band() {
        assert_eq!(SeverityBand::Severe.status(), AnemiaStatus::Anemia);
        assert_eq!(SeverityBand::Moderate.status(), AnemiaStatus::Anemia);
        assert_eq!(SeverityBand::Mild.status(), AnemiaStatus::Anemia);
        assert_eq!(SeverityBand::Normal.status(), AnemiaStatus::Normal);
        assert_eq!(SeverityBand::Elevated.status(), AnemiaStatus::Elevated);
    }

    #[test]
    fn test_sex_parsing() {
        assert_eq!("M".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("f".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("Homme".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("FEMME".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);

        for bad in ["", "x", "unknown", "mf", "0"] {
            assert!(
                matches!(bad.parse::<Sex>(), Err(AnalysisError::InvalidSex(_))),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_band_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SeverityBand::Moderate).unwrap(), "\"moderate\"");
        assert_eq!(serde_json::to_string(&AnemiaStatus::Anemia).unwrap(), "\"anemia\"");
        assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), "\"F\"");
    }
}
