// Image analysis
// Preprocessing, model execution and interpretation of model output

pub mod analyzer;
pub mod error;
pub mod model;
pub mod preprocess;
pub mod severity;

pub use analyzer::{
    top_k, AnalysisOutcome, AnalysisType, AnemiaResult, MedicalAnalyzer, SkinPrediction, SkinResult,
};
pub use error::AnalysisError;
pub use model::{ClassMapping, InferenceModel, ModelProvider, ModelStore, OnnxModel};
pub use preprocess::{preprocess_image, InputTensor, Resampling};
pub use severity::{
    classify_hemoglobin, interpret_hemoglobin, AnemiaAssessment, AnemiaStatus, Sex, SeverityBand,
};
