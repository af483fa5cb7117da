use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};
use validator::{Validate, ValidationErrors};

use health_guard_data::repository::{
    RepositoryError, StorageBackend, UserRepository, UserRepositoryTrait,
};

use crate::analysis::Sex;
use crate::auth::{hash_password, verify_password, SecurityError};
use crate::entities::conversions;
use crate::entities::{NewUser, User};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// User service errors
#[derive(Debug, Error)]
pub enum UserServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// An account with this email already exists
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Not found error
    #[error("User not found: {0}")]
    NotFound(String),

    /// Hashing failure
    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for UserServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(msg) => UserServiceError::EmailTaken(msg),
            RepositoryError::NotFound(msg) => UserServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => UserServiceError::Validation(msg),
            other => UserServiceError::Repository(other.to_string()),
        }
    }
}

/// Trait for user account operations
#[async_trait]
pub trait UserServiceTrait {
    /// Validate and store a new account
    async fn register(&self, new_user: NewUser) -> Result<User, UserServiceError>;

    /// Check credentials and return the matching user
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserServiceError>;

    async fn get_user(&self, id: &str) -> Result<User, UserServiceError>;

    /// Change first and last name
    async fn update_profile(
        &self,
        id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, UserServiceError>;

    /// Replace the password after checking the current one
    async fn change_password(
        &self,
        id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), UserServiceError>;

    async fn list_users(&self) -> Result<Vec<User>, UserServiceError>;
}

/// User service for domain logic
pub struct UserService<R: UserRepositoryTrait> {
    repository: R,
}

impl<R: UserRepositoryTrait> UserService<R> {
    /// Create a new user service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn to_domain(record: health_guard_data::models::UserRecord) -> Result<User, UserServiceError> {
        conversions::convert_to_domain_user(record).map_err(UserServiceError::Repository)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Flatten validator errors into one readable message
fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let error_msgs: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            error_msgs.join(", ")
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

fn check_password_length(password: &str) -> Result<(), UserServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserServiceError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn required_name(value: &str, label: &str) -> Result<String, UserServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(UserServiceError::Validation(format!("{} is required", label)));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl<R: UserRepositoryTrait + Send + Sync> UserServiceTrait for UserService<R> {
    async fn register(&self, new_user: NewUser) -> Result<User, UserServiceError> {
        let new_user = NewUser {
            email: normalize_email(&new_user.email),
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            ..new_user
        };

        new_user
            .validate()
            .map_err(|e| UserServiceError::Validation(validation_message(&e)))?;

        let sex: Sex = new_user
            .sex
            .parse()
            .map_err(|e: crate::analysis::AnalysisError| UserServiceError::Validation(e.to_string()))?;

        if self.repository.get_by_email(&new_user.email).await?.is_some() {
            return Err(UserServiceError::EmailTaken(new_user.email));
        }

        let password_hash = hash_password(&new_user.password)?;
        let record = conversions::convert_to_data_new_user(
            &new_user.email,
            password_hash,
            &new_user.first_name,
            &new_user.last_name,
            sex,
        );

        let created = self.repository.create(record).await.map_err(|e| match e {
            RepositoryError::Duplicate(_) => UserServiceError::EmailTaken(new_user.email.clone()),
            other => other.into(),
        })?;

        info!("Registered user {}", created.id);
        Self::to_domain(created)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserServiceError> {
        let email = normalize_email(email);
        let record = match self.repository.get_by_email(&email).await? {
            Some(record) => record,
            None => {
                debug!("Login attempt for unknown email");
                return Err(UserServiceError::InvalidCredentials);
            }
        };

        if !verify_password(password, &record.password_hash)? {
            debug!("Wrong password for user {}", record.id);
            return Err(UserServiceError::InvalidCredentials);
        }

        Self::to_domain(record)
    }

    async fn get_user(&self, id: &str) -> Result<User, UserServiceError> {
        let record = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(id.to_string()))?;
        Self::to_domain(record)
    }

    async fn update_profile(
        &self,
        id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, UserServiceError> {
        let first_name = required_name(first_name, "First name")?;
        let last_name = required_name(last_name, "Last name")?;

        let record = self
            .repository
            .update_names(id, &first_name, &last_name)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(id.to_string()))?;

        info!("Updated profile of user {}", id);
        Self::to_domain(record)
    }

    async fn change_password(
        &self,
        id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), UserServiceError> {
        if old_password.is_empty() {
            return Err(UserServiceError::Validation("Current password is required".to_string()));
        }
        check_password_length(new_password)?;

        let record = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(id.to_string()))?;

        if !verify_password(old_password, &record.password_hash)? {
            warn!("Password change rejected for user {}: wrong current password", id);
            return Err(UserServiceError::InvalidCredentials);
        }

        let password_hash = hash_password(new_password)?;
        if !self.repository.update_password(id, &password_hash).await? {
            return Err(UserServiceError::NotFound(id.to_string()));
        }

        info!("Password changed for user {}", id);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, UserServiceError> {
        self.repository
            .list()
            .await?
            .into_iter()
            .map(Self::to_domain)
            .collect()
    }
}

/// Create the user service over the given storage backend
pub fn create_default_user_service(backend: StorageBackend) -> Arc<dyn UserServiceTrait + Send + Sync> {
    Arc::new(UserService::new(UserRepository::new(backend)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_guard_data::repository::tests::UnavailableUserRepository;

    fn service() -> UserService<UserRepository> {
        UserService::new(UserRepository::in_memory())
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password: "secret1".to_string(),
            first_name: "Moussa".to_string(),
            last_name: "Traore".to_string(),
            sex: "M".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let service = service();
        let user = service.register(new_user("Moussa@Example.com ")).await.unwrap();
        assert_eq!(user.email, "moussa@example.com");
        assert_eq!(user.sex, Sex::Male);

        let logged_in = service.authenticate("moussa@example.com", "secret1").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let service = service();

        assert!(matches!(
            service.register(new_user("not-an-email")).await,
            Err(UserServiceError::Validation(_))
        ));

        let mut short_password = new_user("p@example.com");
        short_password.password = "12345".to_string();
        assert!(matches!(
            service.register(short_password).await,
            Err(UserServiceError::Validation(msg)) if msg.contains("at least 6")
        ));

        let mut blank_name = new_user("n@example.com");
        blank_name.first_name = "   ".to_string();
        assert!(matches!(
            service.register(blank_name).await,
            Err(UserServiceError::Validation(_))
        ));

        let mut bad_sex = new_user("s@example.com");
        bad_sex.sex = "X".to_string();
        assert!(matches!(
            service.register(bad_sex).await,
            Err(UserServiceError::Validation(msg)) if msg.contains("Invalid sex")
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let service = service();
        service.register(new_user("twice@example.com")).await.unwrap();
        assert!(matches!(
            service.register(new_user("TWICE@example.com")).await,
            Err(UserServiceError::EmailTaken(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_does_not_reveal_which_part_failed() {
        let service = service();
        service.register(new_user("who@example.com")).await.unwrap();

        let unknown = service.authenticate("nobody@example.com", "secret1").await.unwrap_err();
        let wrong = service.authenticate("who@example.com", "wrong-pass").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(wrong, UserServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let service = service();
        let user = service.register(new_user("edit@example.com")).await.unwrap();

        let updated = service.update_profile(&user.id, " Ibrahim ", "Keita").await.unwrap();
        assert_eq!(updated.first_name, "Ibrahim");
        assert_eq!(updated.last_name, "Keita");

        assert!(matches!(
            service.update_profile(&user.id, "", "Keita").await,
            Err(UserServiceError::Validation(_))
        ));
        assert!(matches!(
            service.update_profile("missing", "A", "B").await,
            Err(UserServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let service = service();
        let user = service.register(new_user("pw@example.com")).await.unwrap();

        assert!(matches!(
            service.change_password(&user.id, "wrong-old", "newsecret").await,
            Err(UserServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            service.change_password(&user.id, "secret1", "short").await,
            Err(UserServiceError::Validation(_))
        ));

        service.change_password(&user.id, "secret1", "newsecret").await.unwrap();
        assert!(service.authenticate("pw@example.com", "secret1").await.is_err());
        assert!(service.authenticate("pw@example.com", "newsecret").await.is_ok());
    }

    #[tokio::test]
    async fn test_get_and_list_users() {
        let service = service();
        let first = service.register(new_user("a@example.com")).await.unwrap();
        service.register(new_user("b@example.com")).await.unwrap();

        assert_eq!(service.get_user(&first.id).await.unwrap(), first);
        assert!(matches!(
            service.get_user("nope").await,
            Err(UserServiceError::NotFound(_))
        ));
        assert_eq!(service.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_as_repository_error() {
        let service = UserService::new(UnavailableUserRepository);
        assert!(matches!(
            service.get_user("any").await,
            Err(UserServiceError::Repository(_))
        ));
    }
}
