use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Registration request payload
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PublicSignupRequest {
    /// Email address (must be valid format)
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,

    /// Password (at least 6 characters)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, message = "First name is required"))]
    pub firstname: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub lastname: String,

    /// "M" or "F"
    #[schema(example = "F")]
    pub sex: String,
}

/// Login request payload
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PublicLoginRequest {
    /// Email address
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Access token issued on login or refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicTokenResponse {
    /// JWT access token
    pub token: String,

    /// Token type (Bearer)
    pub token_type: String,

    /// Expiration time in seconds
    pub expires_in: i64,
}

impl PublicTokenResponse {
    pub fn bearer(token: String, expires_in: i64) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
