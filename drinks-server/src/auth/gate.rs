use super::permissions::{check_permission, Claims, RequiredPermission};
use super::AuthError;
use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use http::header::AUTHORIZATION;
use http::request::Parts;
use http::HeaderMap;
use log::{debug, warn};
use std::marker::PhantomData;

/// Extractor that admits a request only if its bearer token carries `P::PERMISSION`.
///
/// Runs before the request body is read, so a rejected request never reaches the
/// handler or the store.
pub struct Authorized<P> {
    pub claims: Claims,
    _permission: PhantomData<fn() -> P>,
}

impl<P: RequiredPermission> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let result = authorize(&parts.headers, state, P::PERMISSION).await;
        match result {
            Ok(claims) => {
                debug!(
                    "Admitted {} for '{}' (token expires at {})",
                    claims.sub,
                    P::PERMISSION,
                    claims.exp
                );
                Ok(Self {
                    claims,
                    _permission: PhantomData,
                })
            }
            Err(err) => {
                warn!(
                    "Rejected {} {}: {} ({})",
                    parts.method,
                    parts.uri.path(),
                    err.code(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

async fn authorize(
    headers: &HeaderMap,
    state: &AppState,
    required: &str,
) -> Result<Claims, AuthError> {
    let token = bearer_token(headers)?;
    let claims = state.verifier.verify(token).await?;
    check_permission(&claims, required)?;
    Ok(claims)
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::AuthHeaderMissing)?
        .to_str()
        .map_err(|_| AuthError::AuthHeaderMalformed)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::AuthHeaderMalformed),
    }
}
