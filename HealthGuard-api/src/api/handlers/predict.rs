use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Extension, Json,
};
use tracing::{debug, info, instrument};

use health_guard_domain::analysis::AnalysisType;
use health_guard_domain::auth::AuthenticatedUser;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::analysis::{PublicPredictForm, PublicPredictionResponse};
use crate::entities::common::PublicErrorResponse;

/// Fields pulled out of the multipart body
#[derive(Debug, Default)]
struct PredictUpload {
    image: Option<Vec<u8>>,
    analysis_type: Option<String>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<PredictUpload, ApiError> {
    let mut upload = PredictUpload::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    upload.image = Some(bytes.to_vec());
                }
            }
            Some("type") => {
                let text = field.text().await?;
                upload.analysis_type = Some(text);
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(upload)
}

/// Analyze a photograph and record the result in the caller's history
#[utoipa::path(
    post,
    path = "/api/v1/predict",
    request_body(content = PublicPredictForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Analysis completed", body = PublicPredictionResponse),
        (status = 400, description = "Missing image or missing/invalid type", body = PublicErrorResponse),
        (status = 401, description = "Missing or invalid token", body = PublicErrorResponse),
        (status = 404, description = "User not found", body = PublicErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = PublicErrorResponse),
        (status = 500, description = "Analysis failed", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "analysis"
)]
#[instrument(skip(state, multipart))]
pub async fn predict(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PublicPredictionResponse>, ApiError> {
    let mut multipart = multipart?;
    let user = state.users.get_user(&auth.user_id).await?;

    let upload = read_upload(&mut multipart).await?;
    let image = upload
        .image
        .ok_or_else(|| ApiError::Validation("No image uploaded".to_string()))?;
    let analysis_type: AnalysisType = upload
        .analysis_type
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Missing analysis type (nail, skin or eye)".to_string()))?
        .trim()
        .parse()?;

    info!("Running {} analysis on {} bytes", analysis_type, image.len());

    let analyzer = Arc::clone(&state.analyzer);
    let sex = user.sex;
    let outcome = tokio::task::spawn_blocking(move || analyzer.analyze(&image, analysis_type, sex))
        .await
        .map_err(|e| ApiError::Internal(format!("Analysis task failed: {}", e)))??;

    let hb_level = outcome.hb_level();
    state
        .history
        .record(
            &user.id,
            outcome.analysis_type(),
            &outcome.history_message(),
            hb_level.as_deref(),
        )
        .await?;

    Ok(Json(outcome.into()))
}
