use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::models::{NewUserRecord, UserRecord};
use super::backend::{timestamp_now, StorageBackend};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepositoryTrait {
    /// Create a user; fails with `Duplicate` when the email is taken
    async fn create(&self, user: NewUserRecord) -> Result<UserRecord, RepositoryError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// All users, oldest account first
    async fn list(&self) -> Result<Vec<UserRecord>, RepositoryError>;

    /// Change first and last name, returning the updated user
    async fn update_names(
        &self,
        id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<UserRecord>, RepositoryError>;

    /// Replace the stored password hash
    async fn update_password(&self, id: &str, password_hash: &str) -> Result<bool, RepositoryError>;
}

/// User repository backed by SQLite or in-memory storage
#[derive(Debug, Clone)]
pub struct UserRepository {
    backend: StorageBackend,
}

impl UserRepository {
    pub fn new(backend: StorageBackend) -> Self {
        Self { backend }
    }

    /// Repository over fresh in-memory storage
    pub fn in_memory() -> Self {
        Self::new(StorageBackend::in_memory())
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, user: NewUserRecord) -> Result<UserRecord, RepositoryError> {
        let now = timestamp_now();
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            sex: user.sex,
            created_at: now.clone(),
            updated_at: now,
        };

        debug!("Creating user {}", record.id);
        match &self.backend {
            StorageBackend::Sqlite(pool) => DatabaseStorage::insert_user(pool, &record)?,
            StorageBackend::InMemory(storage) => storage.insert_user(&record)?,
        }

        Ok(record)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        match &self.backend {
            StorageBackend::Sqlite(pool) => DatabaseStorage::get_user(pool, id),
            StorageBackend::InMemory(storage) => storage.get_user(id),
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        match &self.backend {
            StorageBackend::Sqlite(pool) => DatabaseStorage::find_user_by_email(pool, email),
            StorageBackend::InMemory(storage) => storage.find_user_by_email(email),
        }
    }

    async fn list(&self) -> Result<Vec<UserRecord>, RepositoryError> {
        match &self.backend {
            StorageBackend::Sqlite(pool) => DatabaseStorage::list_users(pool),
            StorageBackend::InMemory(storage) => storage.list_users(),
        }
    }

    async fn update_names(
        &self,
        id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let now = timestamp_now();
        match &self.backend {
            StorageBackend::Sqlite(pool) => {
                if DatabaseStorage::update_user_names(pool, id, first_name, last_name, &now)? {
                    DatabaseStorage::get_user(pool, id)
                } else {
                    Ok(None)
                }
            }
            StorageBackend::InMemory(storage) => storage.modify_user(id, |user| {
                user.first_name = first_name.to_string();
                user.last_name = last_name.to_string();
                user.updated_at = now;
            }),
        }
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> Result<bool, RepositoryError> {
        let now = timestamp_now();
        match &self.backend {
            StorageBackend::Sqlite(pool) => {
                DatabaseStorage::update_user_password(pool, id, password_hash, &now)
            }
            StorageBackend::InMemory(storage) => Ok(storage
                .modify_user(id, |user| {
                    user.password_hash = password_hash.to_string();
                    user.updated_at = now;
                })?
                .is_some()),
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::database::DatabasePool;

    fn new_user(email: &str) -> NewUserRecord {
        NewUserRecord {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Awa".to_string(),
            last_name: "Diallo".to_string(),
            sex: "F".to_string(),
        }
    }

    fn backends() -> Vec<UserRepository> {
        vec![
            UserRepository::in_memory(),
            UserRepository::new(StorageBackend::Sqlite(DatabasePool::in_memory().unwrap())),
        ]
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        for repo in backends() {
            let created = repo.create(new_user("awa@example.com")).await.unwrap();
            assert!(!created.id.is_empty());
            assert_eq!(created.created_at, created.updated_at);

            let by_id = repo.get_by_id(&created.id).await.unwrap();
            assert_eq!(by_id, Some(created.clone()));

            let by_email = repo.get_by_email("awa@example.com").await.unwrap();
            assert_eq!(by_email.map(|u| u.id), Some(created.id));

            assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        for repo in backends() {
            repo.create(new_user("dup@example.com")).await.unwrap();
            let err = repo.create(new_user("dup@example.com")).await.unwrap_err();
            assert!(matches!(err, RepositoryError::Duplicate(_)));
        }
    }

    #[tokio::test]
    async fn test_update_names_and_password() {
        for repo in backends() {
            let created = repo.create(new_user("edit@example.com")).await.unwrap();

            let updated = repo
                .update_names(&created.id, "Fatou", "Sow")
                .await
                .unwrap()
                .unwrap();
            assert_eq!(updated.first_name, "Fatou");
            assert_eq!(updated.last_name, "Sow");
            assert_eq!(updated.email, created.email);

            assert!(repo.update_password(&created.id, "new-hash").await.unwrap());
            let reloaded = repo.get_by_id(&created.id).await.unwrap().unwrap();
            assert_eq!(reloaded.password_hash, "new-hash");

            assert!(repo.update_names("missing", "a", "b").await.unwrap().is_none());
            assert!(!repo.update_password("missing", "x").await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_list_returns_every_user() {
        for repo in backends() {
            repo.create(new_user("one@example.com")).await.unwrap();
            repo.create(new_user("two@example.com")).await.unwrap();

            let users = repo.list().await.unwrap();
            assert_eq!(users.len(), 2);
            assert_eq!(users[0].email, "one@example.com");
        }
    }
}
