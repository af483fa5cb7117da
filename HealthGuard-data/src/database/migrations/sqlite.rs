use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_users_table(conn)?;
    create_history_table(conn)?;
    create_history_indexes(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the users table
fn create_users_table(conn: &Connection) -> Result<(), String> {
    info!("Creating users table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            sex TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create the scan history table
fn create_history_table(conn: &Connection) -> Result<(), String> {
    info!("Creating history table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS history (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            analysis_type TEXT NOT NULL,
            message TEXT NOT NULL,
            hb_level TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create indexes used by per-user history listing
fn create_history_indexes(conn: &Connection) -> Result<(), String> {
    info!("Creating history indexes");

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_history_user_id ON history (user_id);
         CREATE INDEX IF NOT EXISTS idx_history_created_at ON history (created_at DESC);",
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}
