use crate::openapi::AUTH_TAG;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public identity provider settings the frontend needs to start a login
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ClientConfig {
    /// Identity provider domain
    pub domain: String,
    /// API identifier to request tokens for
    pub audience: String,
    /// Frontend client identifier
    pub client_id: String,
}

#[utoipa::path(
    get,
    path = "/auth/config",
    tag = AUTH_TAG,
    responses(
        (status = 200, description = "Identity provider settings", body = ClientConfig)
    )
)]
pub(crate) async fn client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    let auth = &state.settings.auth;
    Json(ClientConfig {
        domain: auth.domain.clone(),
        audience: auth.audience.clone(),
        client_id: auth.client_id.clone(),
    })
}

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/auth/config", get(client_config))
}
