use std::sync::Arc;

use anyhow::{Context, Result};
use health_guard_data::repository::StorageBackend;
use health_guard_domain::analysis::{MedicalAnalyzer, ModelProvider, ModelStore};
use health_guard_domain::auth::TokenService;
use health_guard_domain::health::{HealthService, HealthServiceTrait};
use health_guard_domain::services::{
    create_default_history_service, create_default_user_service, HistoryServiceTrait, UserServiceTrait,
};

use crate::config::AppConfig;

/// Service types for dependency injection
pub type UserServiceRef = Arc<dyn UserServiceTrait + Send + Sync>;
pub type HistoryServiceRef = Arc<dyn HistoryServiceTrait + Send + Sync>;
pub type HealthServiceRef = Arc<dyn HealthServiceTrait + Send + Sync>;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub users: UserServiceRef,
    pub history: HistoryServiceRef,
    pub analyzer: Arc<MedicalAnalyzer>,
    pub tokens: Arc<TokenService>,
    pub health: HealthServiceRef,
}

impl AppState {
    pub fn new(
        users: UserServiceRef,
        history: HistoryServiceRef,
        models: Arc<dyn ModelProvider>,
        tokens: TokenService,
        health: HealthServiceRef,
    ) -> Self {
        Self {
            users,
            history,
            analyzer: Arc::new(MedicalAnalyzer::new(models)),
            tokens: Arc::new(tokens),
            health,
        }
    }

    /// Wire the production services over `backend` and the configured models directory
    pub fn from_config(config: &AppConfig, backend: StorageBackend) -> Result<Self> {
        let tokens = TokenService::new(&config.token_config()).context("Invalid token configuration")?;
        let health: HealthServiceRef = Arc::new(HealthService::new(backend.clone(), &config.models_dir));

        Ok(Self::new(
            create_default_user_service(backend.clone()),
            create_default_history_service(backend),
            Arc::new(ModelStore::new(&config.models_dir)),
            tokens,
            health,
        ))
    }
}
