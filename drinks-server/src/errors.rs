use crate::auth::AuthError;
use crate::store::StoreError;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Every way a request can fail, rendered as the failure envelope
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("resource not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("a drink titled '{0}' already exists")]
    DuplicateTitle(String),
    /// Detail is logged, never returned to the client
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    /// Create a new Bad Request Error (400) with a detail message
    pub fn bad_request<S: ToString>(detail: S) -> Self {
        Self::Validation(detail.to_string())
    }

    /// Create a new Unprocessable Entity Error (422) with a detail message
    pub fn unprocessable<S: ToString>(detail: S) -> Self {
        Self::Unprocessable(detail.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(err) => err.status_code(),
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) | Self::DuplicateTitle(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable name of the failure kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth(err) => err.code(),
            Self::NotFound => "NotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::Validation(_) => "ValidationError",
            Self::Unprocessable(_) => "UnprocessablePayload",
            Self::DuplicateTitle(_) => "DuplicateTitle",
            Self::Internal(_) => "StoreError",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateTitle(title) => Self::DuplicateTitle(title),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Failure envelope returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// HTTP status code
    pub error: u16,
    /// Failure kind, e.g. `PermissionDenied`
    pub code: String,
    /// Human readable description
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        match &self {
            Self::Internal(detail) => error!("Request failed: {detail}"),
            Self::Auth(err) if status_code.is_server_error() => {
                error!("Request failed: {err}")
            }
            _ => {}
        }
        let message = match &self {
            Self::Auth(err) if status_code.is_server_error() => {
                "authorization service unavailable".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorResponse {
            success: false,
            error: status_code.as_u16(),
            code: self.code().to_string(),
            message,
        };
        (status_code, Json(body)).into_response()
    }
}
