//! Handler errors and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use digioh_core::error::FetchError;
use digioh_core::validation::ValidationError;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No such resource, or one the caller may not see.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request body failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unknown role name in a role change.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Backend read or write failed.
    #[error(transparent)]
    Upstream(#[from] FetchError),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl ApiError {
    const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_input"),
            Self::UnknownRole(_) => (StatusCode::UNPROCESSABLE_ENTITY, "unknown_role"),
            Self::Upstream(FetchError::Status { status: 401 | 403, .. }) => {
                (StatusCode::FORBIDDEN, "permission_denied")
            }
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "backend_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, "{}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}
