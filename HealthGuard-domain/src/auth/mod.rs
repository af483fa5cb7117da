//! Authentication module for HealthGuard API
//!
//! Password hashing, JWT access tokens and the middleware that guards the
//! authenticated routes.

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-axum")]
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
#[cfg(feature = "with-axum")]
use std::sync::Arc;
#[cfg(feature = "with-axum")]
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

// JWT handling
pub mod token;

// Password hashing
pub mod password;

// Auth event logging
pub mod logging;

pub use password::{hash_password, verify_password};
pub use token::{IssuedToken, SecurityError, TokenConfig, TokenService};

#[cfg(feature = "with-axum")]
use logging::{log_auth_event, AuthEvent, AuthEventType};

/// Authentication claims for JSON Web Tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Identity attached to requests that passed [`auth_middleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Extract the token from an `Authorization: Bearer <token>` header
#[cfg(feature = "with-axum")]
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or("Authorization header does not contain Bearer token")?
        .trim();

    if token.is_empty() {
        return Err("Bearer token is empty");
    }
    Ok(token)
}

#[cfg(feature = "with-axum")]
fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "unauthorized",
            "message": message,
        })),
    )
        .into_response()
}

/// Authentication middleware for protected routes
#[cfg(feature = "with-axum")]
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let request_path = req.uri().path().to_string();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // Start timing the authentication process
    let start_time = std::time::Instant::now();

    let failure = |user_id: Option<&str>, details: String| {
        let event = AuthEvent::new(AuthEventType::TokenValidation, user_id, false)
            .with_details(details)
            .with_resource(request_path.clone())
            .with_user_agent(user_agent.clone())
            .with_duration(start_time.elapsed().as_millis() as u64)
            .with_auth_method("jwt");
        log_auth_event(event);
    };

    let token = match bearer_token(req.headers()) {
        Ok(token) => token,
        Err(reason) => {
            failure(None, reason.to_string());
            return unauthorized(reason);
        }
    };

    match tokens.validate(token) {
        Ok(claims) => {
            debug!("Token validated successfully for user: {}", claims.sub);

            let event = AuthEvent::new(AuthEventType::TokenValidation, Some(&claims.sub), true)
                .with_resource(request_path.clone())
                .with_user_agent(user_agent.clone())
                .with_duration(start_time.elapsed().as_millis() as u64)
                .with_auth_method("jwt");
            log_auth_event(event);

            req.extensions_mut().insert(AuthenticatedUser {
                user_id: claims.sub.clone(),
            });
            req.extensions_mut().insert(claims);

            next.run(req).await
        }
        Err(SecurityError::TokenExpired) => {
            failure(None, "JWT token has expired".to_string());
            unauthorized("Token has expired")
        }
        Err(e) => {
            failure(None, format!("Token validation error: {}", e));
            unauthorized("Invalid token")
        }
    }
}

/// Apply CORS and security headers to the application
#[cfg(feature = "with-axum")]
pub fn configure_security(app: axum::Router) -> axum::Router {
    use axum::http::{HeaderName, HeaderValue, Method};
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::set_header::SetResponseHeaderLayer;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ));

    app.layer(cors).layer(security_headers)
}
