use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::models::{HistoryRecord, NewHistoryRecord};
use super::backend::{timestamp_now, StorageBackend};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;

/// Repository trait for scan history entries
#[async_trait]
pub trait HistoryRepositoryTrait {
    /// Append an entry stamped with the current time
    async fn create(&self, entry: NewHistoryRecord) -> Result<HistoryRecord, RepositoryError>;

    /// Entries for one user, newest first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<HistoryRecord>, RepositoryError>;

    async fn count_for_user(&self, user_id: &str) -> Result<usize, RepositoryError>;

    /// Delete every entry for the user and return how many were removed
    async fn delete_for_user(&self, user_id: &str) -> Result<usize, RepositoryError>;
}

/// History repository backed by SQLite or in-memory storage
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    backend: StorageBackend,
}

impl HistoryRepository {
    pub fn new(backend: StorageBackend) -> Self {
        Self { backend }
    }

    /// Repository over fresh in-memory storage
    pub fn in_memory() -> Self {
        Self::new(StorageBackend::in_memory())
    }
}

#[async_trait]
impl HistoryRepositoryTrait for HistoryRepository {
    async fn create(&self, entry: NewHistoryRecord) -> Result<HistoryRecord, RepositoryError> {
        let record = HistoryRecord {
            id: Uuid::new_v4().to_string(),
            user_id: entry.user_id,
            analysis_type: entry.analysis_type,
            message: entry.message,
            hb_level: entry.hb_level,
            created_at: timestamp_now(),
        };

        debug!("Recording {} scan for user {}", record.analysis_type, record.user_id);
        match &self.backend {
            StorageBackend::Sqlite(pool) => DatabaseStorage::insert_history(pool, &record)?,
            StorageBackend::InMemory(storage) => storage.insert_history(&record)?,
        }

        Ok(record)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<HistoryRecord>, RepositoryError> {
        match &self.backend {
            StorageBackend::Sqlite(pool) => DatabaseStorage::history_for_user(pool, user_id),
            StorageBackend::InMemory(storage) => storage.history_for_user(user_id),
        }
    }

    async fn count_for_user(&self, user_id: &str) -> Result<usize, RepositoryError> {
        match &self.backend {
            StorageBackend::Sqlite(pool) => DatabaseStorage::count_history_for_user(pool, user_id),
            StorageBackend::InMemory(storage) => storage.count_history_for_user(user_id),
        }
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<usize, RepositoryError> {
        let removed = match &self.backend {
            StorageBackend::Sqlite(pool) => DatabaseStorage::delete_history_for_user(pool, user_id)?,
            StorageBackend::InMemory(storage) => storage.delete_history_for_user(user_id)?,
        };
        debug!("Removed {} history entries for user {}", removed, user_id);
        Ok(removed)
    }
}
