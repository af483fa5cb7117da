//! Model loading and inference
//!
//! Models are opaque: a preprocessed tensor goes in, a flat vector of
//! floats comes out. The filesystem store loads ONNX files on first use
//! and keeps them for the life of the process.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};
use tract_onnx::prelude::*;

use super::analyzer::AnalysisType;
use super::error::AnalysisError;
use super::preprocess::InputTensor;

/// File name of the skin class index mapping inside the models directory
pub const CLASS_MAPPING_FILE: &str = "class_mapping.json";

/// A loaded model that can be run on a preprocessed image
pub trait InferenceModel: Send + Sync {
    /// Run one forward pass and return the first output flattened
    fn run(&self, input: &InputTensor) -> Result<Vec<f32>, AnalysisError>;
}

/// Source of models and the skin class mapping
pub trait ModelProvider: Send + Sync {
    fn model(&self, analysis_type: AnalysisType) -> Result<Arc<dyn InferenceModel>, AnalysisError>;

    fn class_mapping(&self) -> Result<Arc<ClassMapping>, AnalysisError>;
}

/// Index to disease name mapping for the skin classifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMapping {
    names: HashMap<usize, String>,
}

impl ClassMapping {
    /// Parse a JSON object of the form `{"0": "Acne", "1": "Eczema"}`
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let raw: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| AnalysisError::ModelLoad(format!("{}: {}", CLASS_MAPPING_FILE, e)))?;

        let mut names = HashMap::with_capacity(raw.len());
        for (key, name) in raw {
            let index = key.trim().parse::<usize>().map_err(|_| {
                AnalysisError::ModelLoad(format!(
                    "{}: class index '{}' is not a number",
                    CLASS_MAPPING_FILE, key
                ))
            })?;
            names.insert(index, name);
        }

        Ok(Self { names })
    }

    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        if !path.exists() {
            return Err(AnalysisError::ModelNotFound(path.display().to_string()));
        }
        let json = fs::read_to_string(path)
            .map_err(|e| AnalysisError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Build a mapping from names listed in index order
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).enumerate().collect(),
        }
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// ONNX model executed with tract
pub struct OnnxModel {
    plan: OnnxPlan,
}

impl OnnxModel {
    /// Load and optimize a model whose single input is `[1, 224, 224, 3]` f32
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let shape = InputTensor::SHAPE;
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(shape).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| AnalysisError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        Ok(Self { plan })
    }
}

impl InferenceModel for OnnxModel {
    fn run(&self, input: &InputTensor) -> Result<Vec<f32>, AnalysisError> {
        let tensor = Tensor::from_shape(&input.shape(), input.as_slice())
            .map_err(|e| AnalysisError::Inference(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| AnalysisError::Inference(e.to_string()))?;

        let first = outputs
            .first()
            .ok_or_else(|| AnalysisError::InvalidModelOutput("model produced no outputs".to_string()))?;

        let values = first
            .as_slice::<f32>()
            .map_err(|e| AnalysisError::InvalidModelOutput(e.to_string()))?;

        Ok(values.to_vec())
    }
}

/// Loads models from a directory on first use and caches them
pub struct ModelStore {
    models_dir: PathBuf,
    models: Mutex<HashMap<AnalysisType, Arc<dyn InferenceModel>>>,
    class_mapping: Mutex<Option<Arc<ClassMapping>>>,
}

impl ModelStore {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            models: Mutex::new(HashMap::new()),
            class_mapping: Mutex::new(None),
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn model_path(&self, analysis_type: AnalysisType) -> PathBuf {
        self.models_dir.join(analysis_type.model_file())
    }

    /// Expected files that are not present in the models directory
    pub fn missing_files(&self) -> Vec<String> {
        AnalysisType::ALL
            .iter()
            .map(|t| t.model_file())
            .chain(std::iter::once(CLASS_MAPPING_FILE))
            .filter(|file| !self.models_dir.join(file).exists())
            .map(str::to_string)
            .collect()
    }
}

impl ModelProvider for ModelStore {
    fn model(&self, analysis_type: AnalysisType) -> Result<Arc<dyn InferenceModel>, AnalysisError> {
        let mut cache = self
            .models
            .lock()
            .map_err(|e| AnalysisError::ModelLoad(format!("model cache poisoned: {}", e)))?;

        if let Some(model) = cache.get(&analysis_type) {
            debug!("Using cached {} model", analysis_type);
            return Ok(Arc::clone(model));
        }

        let path = self.model_path(analysis_type);
        if !path.exists() {
            return Err(AnalysisError::ModelNotFound(path.display().to_string()));
        }

        info!("Loading {} model from {}", analysis_type, path.display());
        let model: Arc<dyn InferenceModel> = Arc::new(OnnxModel::load(&path)?);
        cache.insert(analysis_type, Arc::clone(&model));

        Ok(model)
    }

    fn class_mapping(&self) -> Result<Arc<ClassMapping>, AnalysisError> {
        let mut cached = self
            .class_mapping
            .lock()
            .map_err(|e| AnalysisError::ModelLoad(format!("class mapping cache poisoned: {}", e)))?;

        if let Some(mapping) = cached.as_ref() {
            return Ok(Arc::clone(mapping));
        }

        let mapping = Arc::new(ClassMapping::from_path(&self.models_dir.join(CLASS_MAPPING_FILE))?);
        info!("Loaded {} skin classes", mapping.len());
        *cached = Some(Arc::clone(&mapping));

        Ok(mapping)
    }
}
