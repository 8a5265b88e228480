pub(crate) mod client_config;
pub(crate) mod drinks;
pub(crate) mod health;

use crate::errors::ApiError;
use crate::state::AppState;
use axum::Router;

/// Combines all API routes into a single router
pub(super) fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(client_config::router())
        .merge(drinks::router())
}

/// Envelope for paths that match no route
pub(super) async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Envelope for known paths hit with an unsupported method
pub(super) async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
