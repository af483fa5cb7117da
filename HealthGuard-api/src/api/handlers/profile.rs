use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::{info, instrument};
use validator::Validate;

use health_guard_domain::auth::logging::log_password_change;
use health_guard_domain::auth::AuthenticatedUser;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::common::{PublicErrorResponse, PublicMessageResponse};
use crate::entities::user::{
    PublicChangePasswordRequest, PublicProfileResponse, PublicUpdateProfileRequest, PublicUser,
};

/// The caller's profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile found", body = PublicProfileResponse),
        (status = 401, description = "Missing or invalid token", body = PublicErrorResponse),
        (status = 404, description = "User not found", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "profile"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<PublicProfileResponse>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let scan_count = state.history.count_for_user(&user.id).await?;

    Ok(Json(PublicProfileResponse {
        user: user.into(),
        scan_count,
    }))
}

/// Change the caller's first and last name
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = PublicUpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = PublicUser),
        (status = 400, description = "First and last name are required", body = PublicErrorResponse),
        (status = 404, description = "User not found", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "profile"
)]
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<PublicUpdateProfileRequest>, JsonRejection>,
) -> Result<Json<PublicUser>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let user = state
        .users
        .update_profile(&auth.user_id, &request.firstname, &request.lastname)
        .await?;

    info!("Updated profile of user {}", user.id);
    Ok(Json(user.into()))
}

/// Replace the caller's password
#[utoipa::path(
    put,
    path = "/api/v1/profile/password",
    request_body = PublicChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = PublicMessageResponse),
        (status = 400, description = "Missing passwords or new password too short", body = PublicErrorResponse),
        (status = 401, description = "Current password is wrong", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "profile"
)]
#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<PublicChangePasswordRequest>, JsonRejection>,
) -> Result<Json<PublicMessageResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    if let Err(e) = state
        .users
        .change_password(&auth.user_id, &request.old_password, &request.new_password)
        .await
    {
        log_password_change(&auth.user_id, false, Some(&e.to_string()));
        return Err(e.into());
    }

    log_password_change(&auth.user_id, true, None);
    Ok(Json(PublicMessageResponse::new("Password changed successfully")))
}
