//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use health_guard_data::repository::StorageBackend;

use crate::analysis::ModelStore;

/// System health status
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced capability
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database.
    /// Returns an error if the storage cannot answer.
    async fn check_database_status(&self) -> Result<String, String>;

    /// Check that the model files are in place
    fn check_models_status(&self) -> HealthComponent;
}

/// Health checks over the storage backend and the models directory
#[derive(Debug, Clone)]
pub struct HealthService {
    storage: StorageBackend,
    models_dir: PathBuf,
}

impl HealthService {
    pub fn new(storage: StorageBackend, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            models_dir: models_dir.into(),
        }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let db_component = match self.check_database_status().await {
            Ok(info) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(info),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };
        let models_component = self.check_models_status();

        // Without storage nothing works; without models only /predict fails
        let overall_status = if db_component.status == ComponentStatus::Unhealthy {
            SystemStatus::Unhealthy
        } else if models_component.status != ComponentStatus::Healthy {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        SystemHealth {
            status: overall_status,
            components: vec![
                ("database".to_string(), db_component),
                ("models".to_string(), models_component),
            ]
            .into_iter()
            .collect(),
        }
    }

    async fn check_database_status(&self) -> Result<String, String> {
        self.storage
            .ping()
            .map(|_| self.storage.describe())
            .map_err(|e| format!("Database connection error: {}", e))
    }

    fn check_models_status(&self) -> HealthComponent {
        if !self.models_dir.is_dir() {
            return HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(format!("Models directory {} not found", self.models_dir.display())),
            };
        }

        let missing = ModelStore::new(&self.models_dir).missing_files();
        if missing.is_empty() {
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(format!("Models loaded from {}", self.models_dir.display())),
            }
        } else {
            HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some(format!("Missing model files: {}", missing.join(", "))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisType;
    use std::fs;

    fn models_dir(with_files: bool) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("healthguard-health-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        if with_files {
            for t in AnalysisType::ALL {
                fs::write(dir.join(t.model_file()), b"").unwrap();
            }
            fs::write(dir.join("class_mapping.json"), b"{}").unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_healthy_when_storage_and_models_present() {
        let dir = models_dir(true);
        let service = HealthService::new(StorageBackend::in_memory(), &dir);

        let health = service.get_system_health().await;
        assert_eq!(health.status, SystemStatus::Healthy);
        assert_eq!(health.components["database"].status, ComponentStatus::Healthy);
        assert_eq!(health.components["models"].status, ComponentStatus::Healthy);

        fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_degraded_when_model_files_missing() {
        let dir = models_dir(false);
        let service = HealthService::new(StorageBackend::in_memory(), &dir);

        let health = service.get_system_health().await;
        assert_eq!(health.status, SystemStatus::Degraded);
        let details = health.components["models"].details.clone().unwrap();
        assert!(details.contains("nail_anemia_model.onnx"));

        fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_models_unhealthy_without_directory() {
        let service = HealthService::new(StorageBackend::in_memory(), "/nonexistent/healthguard/models");
        let health = service.get_system_health().await;
        assert_eq!(health.components["models"].status, ComponentStatus::Unhealthy);
        assert_eq!(health.status, SystemStatus::Degraded);
    }
}
