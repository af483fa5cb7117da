//! Database connection module for the HealthGuard application
//!
//! The pool is created once at startup and handed to the repositories,
//! rather than living in a process-wide global.
//! Two storage backends are supported:
//! - SQLite (default, file-based)
//! - Memory (process-local, nothing survives a restart)

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info};

use super::migrations::run_sqlite_migrations;

/// Pooled SQLite connection handed out by [`DatabasePool::get`]
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based)
    Sqlite,
    /// In-process storage
    Memory,
}

impl DatabaseType {
    /// Convert from string to database type
    pub fn parse(s: &str) -> Result<Self, DatabaseError> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            "memory" | "in-memory" => Ok(DatabaseType::Memory),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),

    /// Generic database error
    #[error("Database error: {0}")]
    GenericError(String),
}

impl From<String> for DatabaseError {
    fn from(error: String) -> Self {
        DatabaseError::GenericError(error)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Storage backend
    pub db_type: DatabaseType,
    /// Path to SQLite database file
    pub sqlite_path: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: "data/healthguard.db".to_string(),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let db_type_str = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        let db_type = DatabaseType::parse(&db_type_str)?;

        let sqlite_path = env::var("DB_SQLITE_PATH").unwrap_or(defaults.sqlite_path);

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_connections);

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        info!(
            "Database configuration: type={:?}, max_connections={}, timeout={}s",
            db_type, max_connections, timeout_seconds
        );

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

/// SQLite connection pool shared by the repositories
#[derive(Clone)]
pub struct DatabasePool {
    pool: Arc<r2d2::Pool<SqliteConnectionManager>>,
}

impl fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state();
        f.debug_struct("DatabasePool")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl DatabasePool {
    /// Check out a connection
    pub fn get(&self) -> Result<PooledConnection, DatabaseError> {
        Ok(self.pool.get()?)
    }

    /// Open a private in-memory SQLite database with the schema applied.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// capped at a single connection.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())?;

        let db = Self { pool: Arc::new(pool) };
        db.migrate()?;
        Ok(db)
    }

    /// Run a trivial query to confirm the database answers
    pub fn ping(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Human readable description of the connection, used by health checks
    pub fn connection_info(&self) -> String {
        let location = self
            .get()
            .ok()
            .and_then(|conn| {
                conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2))
                    .ok()
            })
            .map(|path| {
                if path.is_empty() || path == ":memory:" {
                    "SQLite in-memory database".to_string()
                } else {
                    format!("SQLite database at {}", path)
                }
            })
            .unwrap_or_else(|| "SQLite database (path unknown)".to_string());

        let state = self.pool.state();
        format!(
            "{} (connections: active={}, idle={})",
            location, state.connections, state.idle_connections
        )
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)
    }
}

/// Initialize the SQLite connection pool and run migrations
pub fn initialize_database_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    match config.db_type {
        DatabaseType::Sqlite => {}
        DatabaseType::Memory => {
            return Err(DatabaseError::UnsupportedDatabaseType(
                "memory storage does not use a connection pool".to_string(),
            ))
        }
    }

    info!("Initializing SQLite database at: {}", config.sqlite_path);

    if let Some(parent) = Path::new(&config.sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create directory {:?}: {}", parent, e);
                DatabaseError::GenericError(format!("Failed to create {:?}: {}", parent, e))
            })?;
        }
    }

    let manager = SqliteConnectionManager::file(&config.sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    let db = DatabasePool { pool: Arc::new(pool) };
    db.migrate()?;

    info!("SQLite connection pool created successfully");
    Ok(db)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.db_type, DatabaseType::Sqlite);
        assert_eq!(config.sqlite_path, "data/healthguard.db");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_database_type_parse() {
        assert_eq!(DatabaseType::parse("sqlite").unwrap(), DatabaseType::Sqlite);
        assert_eq!(DatabaseType::parse("SQLite").unwrap(), DatabaseType::Sqlite);
        assert_eq!(DatabaseType::parse("memory").unwrap(), DatabaseType::Memory);
        assert!(DatabaseType::parse("mongodb").is_err());
    }

    #[test]
    fn test_in_memory_pool_answers_ping() {
        let db = DatabasePool::in_memory().unwrap();
        assert!(db.ping().is_ok());
        assert!(db.connection_info().starts_with("SQLite"));
    }

    #[test]
    fn test_memory_type_has_no_pool() {
        let config = DatabaseConfig {
            db_type: DatabaseType::Memory,
            ..DatabaseConfig::default()
        };
        assert!(initialize_database_pool(&config).is_err());
    }
}
