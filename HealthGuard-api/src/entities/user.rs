use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use health_guard_domain::analysis::Sex;
use health_guard_domain::entities::User;

/// User as exposed by the API, never with credentials
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub sex: Sex,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            firstname: user.first_name,
            lastname: user.last_name,
            sex: user.sex,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The caller's profile with the number of analyses on record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicProfileResponse {
    #[serde(flatten)]
    pub user: PublicUser,

    /// Number of history entries
    pub scan_count: usize,
}

/// Profile update payload
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PublicUpdateProfileRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub firstname: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub lastname: String,
}

/// Password change payload
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PublicChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,

    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}
