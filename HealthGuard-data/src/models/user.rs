use serde::{Deserialize, Serialize};

/// Storage model for a user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Login email, unique across users
    pub email: String,

    /// Argon2 PHC string, never the plain password
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,

    /// "M" or "F"
    pub sex: String,

    /// RFC 3339 creation timestamp
    pub created_at: String,

    /// RFC 3339 timestamp of the last profile or password change
    pub updated_at: String,
}

/// Input data for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRecord {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: String,
}
