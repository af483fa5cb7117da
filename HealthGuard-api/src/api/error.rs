use std::collections::BTreeMap;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use health_guard_domain::analysis::AnalysisError;
use health_guard_domain::services::{HistoryServiceError, UserServiceError};

use crate::entities::common::PublicErrorResponse;

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Request body failed field validation; `fields` lists the messages per field
    #[error("{message}")]
    InvalidFields {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("{0}")]
    PayloadTooLarge(String),

    /// The resource already exists. Reported as 400 like any other bad input.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure; the message carries the underlying error text
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidFields { .. } | ApiError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) | ApiError::InvalidFields { .. } => "validation_error",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn user_not_found() -> Self {
        ApiError::NotFound("User not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let details = match &self {
            ApiError::InvalidFields { fields, .. } => serde_json::to_value(fields).ok(),
            _ => None,
        };
        let body = PublicErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::Validation(msg) => ApiError::Validation(msg),
            UserServiceError::EmailTaken(_) => ApiError::Conflict("Email already exists".to_string()),
            UserServiceError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            UserServiceError::NotFound(_) => ApiError::user_not_found(),
            UserServiceError::Security(e) => ApiError::Internal(e.to_string()),
            UserServiceError::Repository(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<HistoryServiceError> for ApiError {
    fn from(err: HistoryServiceError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidAnalysisType(_) | AnalysisError::InvalidSex(_) => {
                ApiError::Validation(err.to_string())
            }
            // Model and image failures surface as 500 with the error text
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Missing or invalid fields: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Validation(format!("Invalid multipart body: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("Payload too large: the upload exceeds the size limit".to_string())
        } else {
            ApiError::Validation(format!("Invalid multipart body: {}", err.body_text()))
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields: BTreeMap<String, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", field))
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        let mut messages: Vec<String> = fields.values().flatten().cloned().collect();
        messages.sort();
        ApiError::InvalidFields {
            message: messages.join("; "),
            fields,
        }
    }
}
