use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{instrument, warn};
use validator::Validate;

use health_guard_domain::auth::logging::{
    log_failed_login, log_registration, log_successful_login, log_token_refresh,
};
use health_guard_domain::auth::{bearer_token, SecurityError};
use health_guard_domain::entities::NewUser;
use health_guard_domain::services::UserServiceError;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::auth::{PublicLoginRequest, PublicSignupRequest, PublicTokenResponse};
use crate::entities::common::{PublicErrorResponse, PublicMessageResponse};

/// Create a new account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = PublicSignupRequest,
    responses(
        (status = 201, description = "User created", body = PublicMessageResponse),
        (status = 400, description = "Missing or invalid fields, or email already registered", body = PublicErrorResponse),
        (status = 500, description = "Internal server error", body = PublicErrorResponse),
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<PublicSignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(mut request) = payload?;
    request.email = request.email.trim().to_string();

    if let Err(errors) = request.validate() {
        log_registration(&request.email, false, Some("validation failed"));
        return Err(errors.into());
    }

    let email = request.email.clone();
    let new_user = NewUser {
        email: request.email,
        password: request.password,
        first_name: request.firstname,
        last_name: request.lastname,
        sex: request.sex,
    };

    match state.users.register(new_user).await {
        Ok(user) => {
            log_registration(&user.email, true, None);
            Ok((
                StatusCode::CREATED,
                Json(PublicMessageResponse::new("User created successfully")),
            ))
        }
        Err(e) => {
            log_registration(&email, false, Some(&e.to_string()));
            Err(e.into())
        }
    }
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = PublicLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = PublicTokenResponse),
        (status = 400, description = "Missing email or password", body = PublicErrorResponse),
        (status = 401, description = "Invalid email or password", body = PublicErrorResponse),
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<PublicLoginRequest>, JsonRejection>,
) -> Result<Json<PublicTokenResponse>, ApiError> {
    let started = Instant::now();
    let Json(request) = payload?;
    request.validate()?;

    let user = match state.users.authenticate(&request.email, &request.password).await {
        Ok(user) => user,
        Err(e) => {
            let reason = match &e {
                UserServiceError::InvalidCredentials => "invalid credentials".to_string(),
                other => other.to_string(),
            };
            log_failed_login(&request.email, &reason);
            return Err(e.into());
        }
    };

    let issued = state
        .tokens
        .issue(&user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    log_successful_login(&user.id, started.elapsed().as_millis() as u64);
    Ok(Json(PublicTokenResponse::bearer(issued.token, issued.expires_in)))
}

/// Issue a fresh access token for a still-valid one
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Token refreshed", body = PublicTokenResponse),
        (status = 401, description = "Missing, invalid or expired token", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, headers))]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PublicTokenResponse>, ApiError> {
    let token = bearer_token(&headers).map_err(|reason| {
        log_token_refresh(None, false, Some(reason));
        ApiError::Unauthorized(reason.to_string())
    })?;

    let claims = state.tokens.validate(token).map_err(|e| {
        log_token_refresh(None, false, Some(&e.to_string()));
        match e {
            SecurityError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    })?;

    // The account behind the token must still exist
    match state.users.get_user(&claims.sub).await {
        Ok(_) => {}
        Err(UserServiceError::NotFound(_)) => {
            warn!("Refresh requested for unknown user {}", claims.sub);
            log_token_refresh(Some(&claims.sub), false, Some("user not found"));
            return Err(ApiError::Unauthorized("Invalid token".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let issued = state
        .tokens
        .issue(&claims.sub)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    log_token_refresh(Some(&claims.sub), true, None);
    Ok(Json(PublicTokenResponse::bearer(issued.token, issued.expires_in)))
}
