use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::{debug, instrument};

use health_guard_domain::auth::AuthenticatedUser;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::common::PublicErrorResponse;
use crate::entities::history::PublicHistoryEntry;
use crate::entities::user::PublicUser;

/// Every registered user
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Registered users", body = [PublicUser]),
        (status = 401, description = "Missing or invalid token", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = state.users.list_users().await?;
    debug!("Listing {} users", users.len());

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Analyses recorded for any user, newest first
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/history",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "History entries", body = [PublicHistoryEntry]),
        (status = 404, description = "Calling user not found", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[instrument(skip(state))]
pub async fn get_user_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<PublicHistoryEntry>>, ApiError> {
    state.users.get_user(&auth.user_id).await?;
    let history = state.history.list_for_user(&user_id).await?;

    Ok(Json(history.into_iter().map(Into::into).collect()))
}
