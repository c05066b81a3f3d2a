//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::content::{ContentError, FieldError, error::failed_languages};

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    languages: Vec<&'a str>,
    retryable: bool,
}

impl ErrorBody<'_> {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
            languages: Vec::new(),
            retryable: false,
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Content(e) => match e {
                ContentError::NotFound { .. } => StatusCode::NOT_FOUND,
                ContentError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ContentError::KindMismatch { .. } => StatusCode::BAD_REQUEST,
                ContentError::Store { .. } | ContentError::Corrupt { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                ContentError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ContentError::PartialWrite { .. } => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Store details stay in the logs
        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %format!("{e:#}"), "internal server error");
                ErrorBody::message("internal server error")
            }
            AppError::Content(e @ (ContentError::Store { .. } | ContentError::Corrupt { .. })) => {
                tracing::error!(error = %e, "content store error");
                ErrorBody::message("internal server error")
            }
            AppError::Content(ContentError::Validation(errors)) => ErrorBody {
                fields: Some(errors.as_slice()),
                ..ErrorBody::message("validation failed")
            },
            AppError::Content(e @ ContentError::PartialWrite { failures, .. }) => ErrorBody {
                languages: failed_languages(failures),
                retryable: e.is_retryable(),
                ..ErrorBody::message(e.to_string())
            },
            AppError::Content(e) => ErrorBody {
                retryable: e.is_retryable(),
                ..ErrorBody::message(e.to_string())
            },
            _ => ErrorBody::message(self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::content::{LanguageFailure, StoreOperation};
    use uuid::Uuid;

    #[test]
    fn content_errors_map_to_statuses() {
        let id = Uuid::now_v7();
        let cases = [
            (ContentError::NotFound { id }, StatusCode::NOT_FOUND),
            (ContentError::Validation(vec![]), StatusCode::UNPROCESSABLE_ENTITY),
            (
                ContentError::Timeout {
                    operation: StoreOperation::UpsertTranslation,
                    entity_id: Some(id),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ContentError::PartialWrite {
                    entity_id: id,
                    failures: vec![LanguageFailure {
                        language: "de".to_string(),
                        reason: "connection reset".to_string(),
                        retryable: true,
                    }],
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                ContentError::Store {
                    operation: StoreOperation::SaveRoot,
                    entity_id: None,
                    source: anyhow::anyhow!("boom"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).into_response().status(), status);
        }
    }
}
