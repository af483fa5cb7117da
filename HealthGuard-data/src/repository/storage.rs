use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::{HistoryRecord, UserRecord};
use super::errors::RepositoryError;

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, sex, created_at, updated_at";

const HISTORY_COLUMNS: &str = "id, user_id, analysis_type, message, hb_level, created_at";

/// SQLite storage operations for users and scan history
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Store a user in the database
    pub fn insert_user(pool: &DatabasePool, user: &UserRecord) -> Result<(), RepositoryError> {
        debug!("Storing user in database: id={}", user.id);
        let conn = pool.get()?;

        conn.execute(
            &format!("INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)", USER_COLUMNS),
            params![
                user.id,
                user.email,
                user.password_hash,
                user.first_name,
                user.last_name,
                user.sex,
                user.created_at,
                user.updated_at,
            ],
        )?;

        Ok(())
    }

    pub fn get_user(pool: &DatabasePool, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let conn = pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                [id],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_user_by_email(pool: &DatabasePool, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let conn = pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                [email],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_users(pool: &DatabasePool) -> Result<Vec<UserRecord>, RepositoryError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC",
            USER_COLUMNS
        ))?;

        let users = stmt
            .query_map([], map_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Update first and last name; returns false when no row matched
    pub fn update_user_names(
        pool: &DatabasePool,
        id: &str,
        first_name: &str,
        last_name: &str,
        updated_at: &str,
    ) -> Result<bool, RepositoryError> {
        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE users SET first_name = ?1, last_name = ?2, updated_at = ?3 WHERE id = ?4",
            params![first_name, last_name, updated_at, id],
        )?;
        Ok(changed > 0)
    }

    /// Replace the password hash; returns false when no row matched
    pub fn update_user_password(
        pool: &DatabasePool,
        id: &str,
        password_hash: &str,
        updated_at: &str,
    ) -> Result<bool, RepositoryError> {
        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
            params![password_hash, updated_at, id],
        )?;
        Ok(changed > 0)
    }

    pub fn insert_history(pool: &DatabasePool, record: &HistoryRecord) -> Result<(), RepositoryError> {
        debug!("Storing history entry in database: id={}", record.id);
        let conn = pool.get()?;

        conn.execute(
            &format!("INSERT INTO history ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", HISTORY_COLUMNS),
            params![
                record.id,
                record.user_id,
                record.analysis_type,
                record.message,
                record.hb_level,
                record.created_at,
            ],
        )?;

        Ok(())
    }

    pub fn history_for_user(pool: &DatabasePool, user_id: &str) -> Result<Vec<HistoryRecord>, RepositoryError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM history WHERE user_id = ?1 ORDER BY created_at DESC",
            HISTORY_COLUMNS
        ))?;

        let entries = stmt
            .query_map([user_id], map_history)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn count_history_for_user(pool: &DatabasePool, user_id: &str) -> Result<usize, RepositoryError> {
        let conn = pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM history WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn delete_history_for_user(pool: &DatabasePool, user_id: &str) -> Result<usize, RepositoryError> {
        let conn = pool.get()?;
        let deleted = conn.execute("DELETE FROM history WHERE user_id = ?1", [user_id])?;
        Ok(deleted)
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        sex: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn map_history(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        analysis_type: row.get(2)?,
        message: row.get(3)?,
        hb_level: row.get(4)?,
        created_at: row.get(5)?,
    })
}
