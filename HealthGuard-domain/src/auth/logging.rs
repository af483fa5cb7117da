use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Account creation
    Registration,
    /// Successful login
    Login,
    /// Failed login attempt
    FailedLogin,
    /// Token refresh
    TokenRefresh,
    /// Bearer token check on a protected route
    TokenValidation,
    /// Password change
    PasswordChange,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::TokenRefresh => write!(f, "TOKEN_REFRESH"),
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
            AuthEventType::PasswordChange => write!(f, "PASSWORD_CHANGE"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    /// Type of authentication event
    pub event_type: AuthEventType,
    /// User ID or submitted email (if available)
    pub user_id: Option<String>,
    /// Timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
    /// User agent string from the client
    pub user_agent: Option<String>,
    /// Whether the event was successful
    pub success: bool,
    /// Additional details about the event
    pub details: Option<String>,
    /// The resource being accessed (if applicable)
    pub resource: Option<String>,
    /// Duration of the operation in milliseconds (if applicable)
    pub duration_ms: Option<u64>,
    /// Authentication method used (password, jwt)
    pub auth_method: Option<String>,
}

impl AuthEvent {
    /// Create a new authentication event
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            user_agent: None,
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }

    /// Single log line used by [`log_auth_event`]
    pub fn summary(&self) -> String {
        let user_id = self.user_id.as_deref().unwrap_or("anonymous");
        let status = if self.success { "SUCCESS" } else { "FAILURE" };
        let mut line = format!(
            "AUTH-LOG [{}] [{}] [{}] [{}]",
            self.event_type,
            user_id,
            status,
            self.timestamp.to_rfc3339()
        );

        if let Some(resource) = &self.resource {
            line.push_str(&format!(" [{}]", resource));
        }
        if let Some(duration) = self.duration_ms {
            line.push_str(&format!(" [{}ms]", duration));
        }
        if let Some(details) = &self.details {
            line.push(' ');
            line.push_str(details);
        }
        line
    }
}

/// Log an authentication event; failures are logged at warn level
pub fn log_auth_event(event: AuthEvent) {
    let line = event.summary();
    if event.success {
        info!(
            auth_method = event.auth_method.as_deref().unwrap_or("none"),
            user_agent = event.user_agent.as_deref().unwrap_or(""),
            "{}",
            line
        );
    } else {
        warn!(
            auth_method = event.auth_method.as_deref().unwrap_or("none"),
            user_agent = event.user_agent.as_deref().unwrap_or(""),
            "{}",
            line
        );
    }
}

/// Log a successful login
pub fn log_successful_login(user_id: &str, duration_ms: u64) {
    let event = AuthEvent::new(AuthEventType::Login, Some(user_id), true)
        .with_duration(duration_ms)
        .with_auth_method("password");

    log_auth_event(event);
}

/// Log a failed login attempt
pub fn log_failed_login(email: &str, reason: &str) {
    let event = AuthEvent::new(AuthEventType::FailedLogin, Some(email), false)
        .with_details(reason)
        .with_auth_method("password");

    log_auth_event(event);
}

/// Log an account creation attempt
pub fn log_registration(email: &str, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::Registration, Some(email), success);

    if let Some(d) = details {
        event = event.with_details(d);
    }

    log_auth_event(event);
}

/// Log a token refresh
pub fn log_token_refresh(user_id: Option<&str>, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::TokenRefresh, user_id, success).with_auth_method("jwt");

    if let Some(d) = details {
        event = event.with_details(d);
    }

    log_auth_event(event);
}

/// Log a password change attempt
pub fn log_password_change(user_id: &str, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::PasswordChange, Some(user_id), success)
        .with_auth_method("password");

    if let Some(d) = details {
        event = event.with_details(d);
    }

    log_auth_event(event);
}
