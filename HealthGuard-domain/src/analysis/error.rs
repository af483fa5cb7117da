use thiserror::Error;

/// Errors raised while turning an uploaded image into a diagnosis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Sex value outside M/F
    #[error("Invalid sex '{0}', expected M or F")]
    InvalidSex(String),

    /// Analysis type outside nail/skin/eye
    #[error("Invalid analysis type '{0}', expected nail, skin or eye")]
    InvalidAnalysisType(String),

    /// The upload could not be decoded as an image
    #[error("Unreadable image: {0}")]
    UnreadableImage(String),

    /// A model or mapping file is missing from the models directory
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    /// A model file exists but could not be loaded
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// The inference runtime failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// The model produced output that cannot be interpreted
    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),
}
