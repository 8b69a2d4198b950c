//! Mapping from core and upload errors to HTTP responses.

use api_shared::{ErrorRes, FieldViolationRes, ValidationErrorRes};
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docsos_core::{DocsError, ValidationError};
use docsos_files::FilesError;

/// Error returned by REST handlers.
///
/// Validation failures become `422` with one entry per violated field, other client mistakes
/// become `400`, and store or filesystem failures become `500`. Every body carries `detail`.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    BadRequest(String),
    Status(StatusCode, String),
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Status(code, _) => *code,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DocsError> for ApiError {
    fn from(err: DocsError) -> Self {
        match err {
            DocsError::Validation(e) => ApiError::Validation(e),
            DocsError::Reference(msg) => ApiError::BadRequest(msg),
            e @ DocsError::InvalidFilter(_) => ApiError::BadRequest(e.to_string()),
            e @ (DocsError::InvalidConfig(_) | DocsError::Store(_)) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<FilesError> for ApiError {
    fn from(err: FilesError) -> Self {
        match err {
            e @ FilesError::InvalidFilename(_) => ApiError::BadRequest(e.to_string()),
            e @ FilesError::NotFound(_) => ApiError::Status(StatusCode::NOT_FOUND, e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Status(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(e) => {
                let detail = e
                    .violations()
                    .iter()
                    .map(|v| FieldViolationRes {
                        field: v.field.clone(),
                        message: v.message.clone(),
                    })
                    .collect();
                (status, Json(ValidationErrorRes { detail })).into_response()
            }
            ApiError::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                (status, Json(ErrorRes { detail })).into_response()
            }
            ApiError::BadRequest(detail) | ApiError::Status(_, detail) => {
                (status, Json(ErrorRes { detail })).into_response()
            }
        }
    }
}
