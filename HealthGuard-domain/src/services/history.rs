use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::info;

use health_guard_data::models::HistoryRecord;
use health_guard_data::repository::{
    HistoryRepository, HistoryRepositoryTrait, RepositoryError, StorageBackend,
};

use crate::analysis::AnalysisType;
use crate::entities::conversions;
use crate::entities::{DataExport, HistoryEntry, User};

/// History service errors
#[derive(Debug, Error)]
pub enum HistoryServiceError {
    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for HistoryServiceError {
    fn from(err: RepositoryError) -> Self {
        HistoryServiceError::Repository(err.to_string())
    }
}

/// Trait for scan history operations
#[async_trait]
pub trait HistoryServiceTrait {
    /// Store the result of one analysis
    async fn record(
        &self,
        user_id: &str,
        analysis_type: AnalysisType,
        message: &str,
        hb_level: Option<&str>,
    ) -> Result<HistoryEntry, HistoryServiceError>;

    /// A user's history, newest first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<HistoryEntry>, HistoryServiceError>;

    async fn count_for_user(&self, user_id: &str) -> Result<usize, HistoryServiceError>;

    /// Remove a user's whole history and return how many entries went away
    async fn delete_for_user(&self, user_id: &str) -> Result<usize, HistoryServiceError>;

    /// Bundle the user's profile and history for download
    async fn export_for_user(&self, user: &User) -> Result<DataExport, HistoryServiceError>;
}

/// History service for domain logic
pub struct HistoryService<R: HistoryRepositoryTrait> {
    repository: R,
}

impl<R: HistoryRepositoryTrait> HistoryService<R> {
    /// Create a new history service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn to_domain(records: Vec<HistoryRecord>) -> Result<Vec<HistoryEntry>, HistoryServiceError> {
        records
            .into_iter()
            .map(|record| conversions::convert_to_domain_history(record).map_err(HistoryServiceError::Repository))
            .collect()
    }
}

#[async_trait]
impl<R: HistoryRepositoryTrait + Send + Sync> HistoryServiceTrait for HistoryService<R> {
    async fn record(
        &self,
        user_id: &str,
        analysis_type: AnalysisType,
        message: &str,
        hb_level: Option<&str>,
    ) -> Result<HistoryEntry, HistoryServiceError> {
        let new_record = conversions::convert_to_data_new_history(user_id, analysis_type, message, hb_level);
        let stored = self.repository.create(new_record).await?;
        conversions::convert_to_domain_history(stored).map_err(HistoryServiceError::Repository)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<HistoryEntry>, HistoryServiceError> {
        let records = self.repository.list_for_user(user_id).await?;
        Self::to_domain(records)
    }

    async fn count_for_user(&self, user_id: &str) -> Result<usize, HistoryServiceError> {
        Ok(self.repository.count_for_user(user_id).await?)
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<usize, HistoryServiceError> {
        let removed = self.repository.delete_for_user(user_id).await?;
        info!("Cleared {} history entries for user {}", removed, user_id);
        Ok(removed)
    }

    async fn export_for_user(&self, user: &User) -> Result<DataExport, HistoryServiceError> {
        let history = self.list_for_user(&user.id).await?;
        Ok(DataExport {
            user: user.clone(),
            history,
            exported_at: Utc::now(),
        })
    }
}

/// Create the history service over the given storage backend
pub fn create_default_history_service(
    backend: StorageBackend,
) -> Arc<dyn HistoryServiceTrait + Send + Sync> {
    Arc::new(HistoryService::new(HistoryRepository::new(backend)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Sex;
    use health_guard_data::repository::tests::UnavailableHistoryRepository;

    fn service() -> HistoryService<HistoryRepository> {
        HistoryService::new(HistoryRepository::in_memory())
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            first_name: "Aminata".to_string(),
            last_name: "Coulibaly".to_string(),
            sex: Sex::Female,
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let service = service();
        let entry = service
            .record("u1", AnalysisType::Nail, "Mild anemia detected", Some("110.0 g/L"))
            .await
            .unwrap();
        assert_eq!(entry.analysis_type, AnalysisType::Nail);
        assert_eq!(entry.hb_level.as_deref(), Some("110.0 g/L"));

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        service.record("u1", AnalysisType::Skin, "Acne", None).await.unwrap();

        let history = service.list_for_user("u1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].analysis_type, AnalysisType::Skin);
        assert_eq!(service.count_for_user("u1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_for_user() {
        let service = service();
        service.record("u1", AnalysisType::Eye, "m", Some("150.0 g/L")).await.unwrap();
        service.record("u2", AnalysisType::Eye, "m", Some("150.0 g/L")).await.unwrap();

        assert_eq!(service.delete_for_user("u1").await.unwrap(), 1);
        assert_eq!(service.count_for_user("u1").await.unwrap(), 0);
        assert_eq!(service.count_for_user("u2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_export_contains_user_and_history() {
        let service = service();
        service.record("u1", AnalysisType::Nail, "m", Some("99.0 g/L")).await.unwrap();
        service.record("u2", AnalysisType::Nail, "m", Some("99.0 g/L")).await.unwrap();

        let export = service.export_for_user(&user("u1")).await.unwrap();
        assert_eq!(export.user.id, "u1");
        assert_eq!(export.history.len(), 1);
        assert!(export.history.iter().all(|h| h.user_id == "u1"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let service = HistoryService::new(UnavailableHistoryRepository);
        assert!(service.list_for_user("u1").await.is_err());
        assert!(service
            .record("u1", AnalysisType::Skin, "Acne", None)
            .await
            .is_err());
    }
}
