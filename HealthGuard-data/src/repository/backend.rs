use chrono::{SecondsFormat, Utc};

use crate::database::{initialize_database_pool, DatabaseConfig, DatabaseError, DatabasePool, DatabaseType};
use super::in_memory::InMemoryStorage;

/// Where repositories keep their records
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// SQLite through the shared connection pool
    Sqlite(DatabasePool),
    /// Process-local maps
    InMemory(InMemoryStorage),
}

impl StorageBackend {
    /// Build the backend selected by the configuration
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        match config.db_type {
            DatabaseType::Sqlite => Ok(StorageBackend::Sqlite(initialize_database_pool(config)?)),
            DatabaseType::Memory => Ok(StorageBackend::InMemory(InMemoryStorage::new())),
        }
    }

    pub fn in_memory() -> Self {
        StorageBackend::InMemory(InMemoryStorage::new())
    }

    /// Confirm the backend can serve requests
    pub fn ping(&self) -> Result<(), DatabaseError> {
        match self {
            StorageBackend::Sqlite(pool) => pool.ping(),
            StorageBackend::InMemory(_) => Ok(()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StorageBackend::Sqlite(pool) => pool.connection_info(),
            StorageBackend::InMemory(_) => "In-memory storage".to_string(),
        }
    }
}

/// Current time as an RFC 3339 string with microseconds.
///
/// Stored timestamps sort lexicographically in time order.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
