use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::error::AnalysisError;
use super::model::ModelProvider;
use super::preprocess::{preprocess_image, Resampling};
use super::severity::{interpret_hemoglobin, AnemiaAssessment, Sex};

/// Number of skin predictions returned to the client
pub const SKIN_TOP_K: usize = 3;

/// Kind of photograph being analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Nail,
    Skin,
    Eye,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 3] = [AnalysisType::Nail, AnalysisType::Skin, AnalysisType::Eye];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Nail => "nail",
            AnalysisType::Skin => "skin",
            AnalysisType::Eye => "eye",
        }
    }

    /// Model file name inside the models directory
    pub fn model_file(&self) -> &'static str {
        match self {
            AnalysisType::Nail => "nail_anemia_model.onnx",
            AnalysisType::Skin => "skin_disease_model.onnx",
            AnalysisType::Eye => "eye_anemia_model.onnx",
        }
    }

    fn resampling(&self) -> Resampling {
        match self {
            AnalysisType::Nail | AnalysisType::Eye => Resampling::Bilinear,
            AnalysisType::Skin => Resampling::Lanczos,
        }
    }
}

impl FromStr for AnalysisType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nail" => Ok(AnalysisType::Nail),
            "skin" => Ok(AnalysisType::Skin),
            "eye" => Ok(AnalysisType::Eye),
            _ => Err(AnalysisError::InvalidAnalysisType(s.to_string())),
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a nail or eye hemoglobin regression
#[derive(Debug, Clone, PartialEq)]
pub struct AnemiaResult {
    pub analysis_type: AnalysisType,
    pub assessment: AnemiaAssessment,
}

/// One ranked skin disease prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SkinPrediction {
    pub disease: String,
    /// Probability as a percentage rounded to two decimals
    pub confidence: f64,
}

/// Result of the skin disease classifier
#[derive(Debug, Clone, PartialEq)]
pub struct SkinResult {
    /// Highest probability first
    pub predictions: Vec<SkinPrediction>,
}

impl SkinResult {
    pub fn primary(&self) -> Option<&SkinPrediction> {
        self.predictions.first()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Anemia(AnemiaResult),
    Skin(SkinResult),
}

impl AnalysisOutcome {
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            AnalysisOutcome::Anemia(result) => result.analysis_type,
            AnalysisOutcome::Skin(_) => AnalysisType::Skin,
        }
    }

    /// Message stored in the scan history
    pub fn history_message(&self) -> String {
        match self {
            AnalysisOutcome::Anemia(result) => result.assessment.message.clone(),
            AnalysisOutcome::Skin(result) => result
                .primary()
                .map(|p| p.disease.clone())
                .unwrap_or_default(),
        }
    }

    pub fn hb_level(&self) -> Option<String> {
        match self {
            AnalysisOutcome::Anemia(result) => Some(result.assessment.hb_level.clone()),
            AnalysisOutcome::Skin(_) => None,
        }
    }
}

/// Indices of the `k` largest values, largest first; ties keep the lower index first
pub fn top_k(values: &[f32], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));
    indices.truncate(k);
    indices
}

fn round_percentage(probability: f32) -> f64 {
    (probability as f64 * 100.0 * 100.0).round() / 100.0
}

/// Routes an image to the model for its analysis type and interprets the output
pub struct MedicalAnalyzer {
    provider: Arc<dyn ModelProvider>,
}

impl MedicalAnalyzer {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    /// Run the full pipeline. This blocks for the duration of inference.
    pub fn analyze(
        &self,
        image_bytes: &[u8],
        analysis_type: AnalysisType,
        sex: Sex,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let input = preprocess_image(image_bytes, analysis_type.resampling())?;
        let model = self.provider.model(analysis_type)?;
        let output = model.run(&input)?;
        debug!("{} model returned {} values", analysis_type, output.len());

        let outcome = match analysis_type {
            AnalysisType::Nail | AnalysisType::Eye => {
                AnalysisOutcome::Anemia(self.interpret_anemia(analysis_type, &output, sex)?)
            }
            AnalysisType::Skin => AnalysisOutcome::Skin(self.interpret_skin(&output)?),
        };

        info!("{} analysis completed", analysis_type);
        Ok(outcome)
    }

    fn interpret_anemia(
        &self,
        analysis_type: AnalysisType,
        output: &[f32],
        sex: Sex,
    ) -> Result<AnemiaResult, AnalysisError> {
        let hb = *output.first().ok_or_else(|| {
            AnalysisError::InvalidModelOutput(format!("{} model returned no values", analysis_type))
        })?;

        if !hb.is_finite() {
            return Err(AnalysisError::InvalidModelOutput(format!(
                "{} model returned a non-finite hemoglobin value",
                analysis_type
            )));
        }

        Ok(AnemiaResult {
            analysis_type,
            assessment: interpret_hemoglobin(hb, sex),
        })
    }

    fn interpret_skin(&self, output: &[f32]) -> Result<SkinResult, AnalysisError> {
        if output.is_empty() {
            return Err(AnalysisError::InvalidModelOutput(
                "skin model returned no probabilities".to_string(),
            ));
        }
        if output.iter().any(|p| !p.is_finite()) {
            return Err(AnalysisError::InvalidModelOutput(
                "skin model returned a non-finite probability".to_string(),
            ));
        }

        let mapping = self.provider.class_mapping()?;
        let predictions = top_k(output, SKIN_TOP_K)
            .into_iter()
            .map(|index| {
                let disease = mapping.name(index).ok_or_else(|| {
                    AnalysisError::InvalidModelOutput(format!("class index {} has no name", index))
                })?;
                Ok(SkinPrediction {
                    disease: disease.to_string(),
                    confidence: round_percentage(output[index]),
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;

        Ok(SkinResult { predictions })
    }
}
