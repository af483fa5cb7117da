use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_guard_domain::analysis::{
    AnalysisOutcome, AnalysisType, AnemiaResult, AnemiaStatus, SeverityBand, SkinPrediction, SkinResult,
};

/// Multipart form accepted by `/predict`
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublicPredictForm {
    /// Photograph to analyze (any common image format)
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,

    /// Which model to run
    #[serde(rename = "type")]
    pub analysis_type: AnalysisType,
}

/// Hemoglobin estimate from a nail or eye photograph
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicAnemiaPrediction {
    pub success: bool,
    pub analysis_type: AnalysisType,
    /// Advisory message for the severity band
    pub message: String,
    /// Formatted estimate, e.g. "112.4 g/L"
    #[schema(example = "112.4 g/L")]
    pub hb_level: String,
    pub severity: SeverityBand,
    pub status: AnemiaStatus,
}

/// Most likely skin conditions, most probable first
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicSkinPrediction {
    pub success: bool,
    pub analysis_type: AnalysisType,
    pub predictions: Vec<SkinPrediction>,
    pub primary_diagnosis: String,
    /// Confidence of the primary diagnosis, in percent
    pub confidence: f64,
}

/// Body of a successful `/predict` call
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PublicPredictionResponse {
    Anemia(PublicAnemiaPrediction),
    Skin(PublicSkinPrediction),
}

impl From<AnemiaResult> for PublicAnemiaPrediction {
    fn from(result: AnemiaResult) -> Self {
        let assessment = result.assessment;
        Self {
            success: true,
            analysis_type: result.analysis_type,
            message: assessment.message,
            hb_level: assessment.hb_level,
            severity: assessment.band,
            status: assessment.status,
        }
    }
}

impl From<SkinResult> for PublicSkinPrediction {
    fn from(result: SkinResult) -> Self {
        let (primary_diagnosis, confidence) = result
            .primary()
            .map(|p| (p.disease.clone(), p.confidence))
            .unwrap_or_default();
        Self {
            success: true,
            analysis_type: AnalysisType::Skin,
            predictions: result.predictions,
            primary_diagnosis,
            confidence,
        }
    }
}

impl From<AnalysisOutcome> for PublicPredictionResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Anemia(result) => PublicPredictionResponse::Anemia(result.into()),
            AnalysisOutcome::Skin(result) => PublicPredictionResponse::Skin(result.into()),
        }
    }
}
