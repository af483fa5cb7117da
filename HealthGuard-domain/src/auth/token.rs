use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::auth::Claims;

/// Default access token lifetime in hours
pub const DEFAULT_ACCESS_TOKEN_HOURS: i64 = 24;

/// Default `iss` claim
pub const DEFAULT_ISSUER: &str = "healthguard-api";

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),

    /// Password hashing or hash parsing failed
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

/// Settings for issuing and checking access tokens
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret shared by issuing and validation
    pub secret: String,
    /// Value of the `iss` claim
    pub issuer: String,
    /// Access token lifetime in hours
    pub access_ttl_hours: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            access_ttl_hours: DEFAULT_ACCESS_TOKEN_HOURS,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_ttl_hours(mut self, hours: i64) -> Self {
        self.access_ttl_hours = hours;
        self
    }
}

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates HS256 access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Result<Self, SecurityError> {
        if config.secret.is_empty() {
            error!("JWT secret is empty");
            return Err(SecurityError::ConfigError("JWT secret must not be empty".to_string()));
        }
        if config.access_ttl_hours <= 0 {
            return Err(SecurityError::ConfigError(format!(
                "Access token lifetime must be positive, got {} hours",
                config.access_ttl_hours
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl: Duration::hours(config.access_ttl_hours),
        })
    }

    /// Lifetime of issued tokens in seconds
    pub fn expires_in(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Generate a new access token for the user
    pub fn issue(&self, user_id: &str) -> Result<IssuedToken, SecurityError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to encode JWT token: {}", e);
            SecurityError::TokenValidation(e.to_string())
        })?;

        // Log token generation (but not the token itself)
        info!("Issued access token for user {}", user_id);
        debug!("Token expiration: {}", expires_at);

        Ok(IssuedToken {
            token,
            expires_in: self.expires_in(),
            expires_at,
        })
    }

    /// Validate a JWT token and return the decoded claims
    pub fn validate(&self, token: &str) -> Result<Claims, SecurityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_issuer(&[self.issuer.as_str()]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
                ErrorKind::InvalidToken => SecurityError::InvalidToken,
                ErrorKind::InvalidIssuer => SecurityError::InvalidIssuer,
                ErrorKind::InvalidSignature => {
                    SecurityError::TokenValidation("Invalid signature".to_string())
                }
                _ => SecurityError::TokenValidation(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}
