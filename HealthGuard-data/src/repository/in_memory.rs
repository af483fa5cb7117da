use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::{HistoryRecord, UserRecord};
use super::errors::RepositoryError;

/// In-memory storage for users and scan history.
///
/// Clones share the same underlying maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<Mutex<HashMap<String, UserRecord>>>,
    history: Arc<Mutex<Vec<HistoryRecord>>>,
}

impl InMemoryStorage {
    /// Create a new, empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new user, rejecting a second account with the same email
    pub fn insert_user(&self, user: &UserRecord) -> Result<(), RepositoryError> {
        let mut users = self.users.lock()?;

        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Duplicate(format!("users.email: {}", user.email)));
        }

        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let users = self.users.lock()?;
        Ok(users.get(id).cloned())
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let users = self.users.lock()?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    /// All users ordered by creation time
    pub fn list_users(&self) -> Result<Vec<UserRecord>, RepositoryError> {
        let users = self.users.lock()?;
        let mut all: Vec<UserRecord> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    /// Apply `change` to the stored user and return the updated copy
    pub fn modify_user<F>(&self, id: &str, change: F) -> Result<Option<UserRecord>, RepositoryError>
    where
        F: FnOnce(&mut UserRecord),
    {
        let mut users = self.users.lock()?;
        Ok(users.get_mut(id).map(|user| {
            change(user);
            user.clone()
        }))
    }

    pub fn insert_history(&self, record: &HistoryRecord) -> Result<(), RepositoryError> {
        let mut history = self.history.lock()?;
        history.push(record.clone());
        Ok(())
    }

    /// History for one user, newest first
    pub fn history_for_user(&self, user_id: &str) -> Result<Vec<HistoryRecord>, RepositoryError> {
        let history = self.history.lock()?;
        let mut entries: Vec<HistoryRecord> = history
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    pub fn count_history_for_user(&self, user_id: &str) -> Result<usize, RepositoryError> {
        let history = self.history.lock()?;
        Ok(history.iter().filter(|h| h.user_id == user_id).count())
    }

    /// Remove every history entry for the user, returning how many were removed
    pub fn delete_history_for_user(&self, user_id: &str) -> Result<usize, RepositoryError> {
        let mut history = self.history.lock()?;
        let before = history.len();
        history.retain(|h| h.user_id != user_id);
        Ok(before - history.len())
    }
}
