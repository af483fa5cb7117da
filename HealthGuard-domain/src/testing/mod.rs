// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};

// Re-export failing repositories from the data layer
pub use health_guard_data::repository::tests::{UnavailableHistoryRepository, UnavailableUserRepository};
use health_guard_data::repository::StorageBackend;

use crate::analysis::{
    AnalysisError, AnalysisType, ClassMapping, InferenceModel, InputTensor, ModelProvider,
};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::{
    create_default_history_service, create_default_user_service, HistoryServiceTrait, UserServiceTrait,
};

/// Model that returns the same output for every input and counts its calls
#[derive(Debug, Default)]
pub struct StaticModel {
    output: Vec<f32>,
    calls: AtomicUsize,
}

impl StaticModel {
    pub fn new(output: Vec<f32>) -> Self {
        Self {
            output,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InferenceModel for StaticModel {
    fn run(&self, _input: &InputTensor) -> Result<Vec<f32>, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

/// Model provider backed by in-memory models, for tests that must not touch disk
#[derive(Default)]
pub struct FakeModelProvider {
    models: HashMap<AnalysisType, Arc<StaticModel>>,
    class_mapping: Option<Arc<ClassMapping>>,
}

impl FakeModelProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model that always outputs `output`
    pub fn with_output(mut self, analysis_type: AnalysisType, output: Vec<f32>) -> Self {
        self.models.insert(analysis_type, Arc::new(StaticModel::new(output)));
        self
    }

    pub fn with_class_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class_mapping = Some(Arc::new(ClassMapping::from_names(names)));
        self
    }

    /// The registered model for `analysis_type`, to inspect call counts
    pub fn static_model(&self, analysis_type: AnalysisType) -> Option<Arc<StaticModel>> {
        self.models.get(&analysis_type).cloned()
    }
}

impl ModelProvider for FakeModelProvider {
    fn model(&self, analysis_type: AnalysisType) -> Result<Arc<dyn InferenceModel>, AnalysisError> {
        self.models
            .get(&analysis_type)
            .map(|model| Arc::clone(model) as Arc<dyn InferenceModel>)
            .ok_or_else(|| AnalysisError::ModelNotFound(analysis_type.model_file().to_string()))
    }

    fn class_mapping(&self) -> Result<Arc<ClassMapping>, AnalysisError> {
        self.class_mapping
            .clone()
            .ok_or_else(|| AnalysisError::ModelNotFound("class_mapping.json".to_string()))
    }
}

/// Provider with a nail, eye and four-class skin model wired up
pub fn fake_model_provider(hb_g_per_l: f32) -> FakeModelProvider {
    FakeModelProvider::new()
        .with_output(AnalysisType::Nail, vec![hb_g_per_l])
        .with_output(AnalysisType::Eye, vec![hb_g_per_l])
        .with_output(AnalysisType::Skin, vec![0.05, 0.7, 0.15, 0.1])
        .with_class_names(["Acne", "Eczema", "Psoriasis", "Rosacea"])
}

/// A small valid PNG upload
pub fn sample_png() -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    // Encoding an in-memory RGB image to PNG cannot fail
    let _ = RgbImage::from_pixel(16, 16, Rgb([190, 110, 100])).write_to(&mut bytes, ImageFormat::Png);
    bytes.into_inner()
}

/// User and history services sharing one fresh in-memory store
pub fn in_memory_services() -> (
    Arc<dyn UserServiceTrait + Send + Sync>,
    Arc<dyn HistoryServiceTrait + Send + Sync>,
) {
    let backend = StorageBackend::in_memory();
    (
        create_default_user_service(backend.clone()),
        create_default_history_service(backend),
    )
}

/// Mock implementation of the HealthServiceTrait for testing
#[derive(Debug, Clone)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    models_status: ComponentStatus,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service where everything is healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            models_status: ComponentStatus::Healthy,
        }
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    /// Configure the mock with model files missing
    pub fn with_missing_models(mut self) -> Self {
        self.models_status = ComponentStatus::Degraded;
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let status = if self.database_status == ComponentStatus::Unhealthy {
            SystemStatus::Unhealthy
        } else if self.models_status != ComponentStatus::Healthy {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        let mut components = HashMap::new();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status,
                details: match self.database_status {
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                    _ => Some("In-memory storage".to_string()),
                },
            },
        );
        components.insert("models".to_string(), self.check_models_status());

        SystemHealth { status, components }
    }

    async fn check_database_status(&self) -> Result<String, String> {
        match self.database_status {
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
            _ => Ok("In-memory storage".to_string()),
        }
    }

    fn check_models_status(&self) -> HealthComponent {
        HealthComponent {
            status: self.models_status,
            details: match self.models_status {
                ComponentStatus::Healthy => None,
                _ => Some("Missing model files: skin_disease_model.onnx".to_string()),
            },
        }
    }
}
