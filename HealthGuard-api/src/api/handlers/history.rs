use axum::{extract::State, Extension, Json};
use tracing::{info, instrument};

use health_guard_domain::auth::AuthenticatedUser;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::common::PublicErrorResponse;
use crate::entities::history::{PublicDataExport, PublicDeleteHistoryResponse, PublicHistoryEntry};

/// The caller's analyses, newest first
#[utoipa::path(
    get,
    path = "/api/v1/history",
    responses(
        (status = 200, description = "History entries", body = [PublicHistoryEntry]),
        (status = 401, description = "Missing or invalid token", body = PublicErrorResponse),
        (status = 404, description = "User not found", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "history"
)]
#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<PublicHistoryEntry>>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let history = state.history.list_for_user(&user.id).await?;

    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// Remove every analysis recorded for the caller
#[utoipa::path(
    delete,
    path = "/api/v1/history",
    responses(
        (status = 200, description = "History cleared", body = PublicDeleteHistoryResponse),
        (status = 404, description = "User not found", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "history"
)]
#[instrument(skip(state))]
pub async fn delete_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<PublicDeleteHistoryResponse>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let deleted = state.history.delete_for_user(&user.id).await?;

    info!("User {} cleared {} history entries", user.id, deleted);
    Ok(Json(PublicDeleteHistoryResponse {
        message: format!("{} entries deleted", deleted),
        deleted,
    }))
}

/// Download the caller's profile and history
#[utoipa::path(
    get,
    path = "/api/v1/history/export",
    responses(
        (status = 200, description = "Data export", body = PublicDataExport),
        (status = 404, description = "User not found", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "history"
)]
#[instrument(skip(state))]
pub async fn export_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<PublicDataExport>, ApiError> {
    let user = state.users.get_user(&auth.user_id).await?;
    let export = state.history.export_for_user(&user).await?;

    Ok(Json(export.into()))
}
