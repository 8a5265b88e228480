use super::AuthError;
use serde::Deserialize;
use std::collections::HashSet;

/// Verified identity of the caller, alive for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user id at the identity provider)
    pub sub: String,
    /// Permission strings granted to the caller, e.g. `post:drinks`
    pub permissions: HashSet<String>,
    /// Expiration (unix timestamp)
    pub exp: u64,
}

impl Claims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Token payload as issued; `permissions` is only present when RBAC is enabled for the API
#[derive(Debug, Deserialize)]
pub(super) struct TokenPayload {
    #[serde(default)]
    sub: String,
    exp: u64,
    permissions: Option<Vec<String>>,
}

impl TryFrom<TokenPayload> for Claims {
    type Error = AuthError;

    fn try_from(payload: TokenPayload) -> Result<Self, Self::Error> {
        let permissions = payload.permissions.ok_or_else(|| {
            AuthError::TokenInvalidClaims("permissions not included in token".to_string())
        })?;
        Ok(Self {
            sub: payload.sub,
            permissions: permissions.into_iter().collect(),
            exp: payload.exp,
        })
    }
}

/// Allows the call only if `required` is in the verified permission set
pub fn check_permission(claims: &Claims, required: &str) -> Result<(), AuthError> {
    if claims.has_permission(required) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied(required.to_string()))
    }
}

/// A permission an endpoint requires, named at the type level
pub trait RequiredPermission: Send + Sync + 'static {
    const PERMISSION: &'static str;
}

/// `GET /drinks-detail`
pub struct GetDrinksDetail;
/// `POST /drinks`
pub struct PostDrinks;
/// `PATCH /drinks/{id}`
pub struct PatchDrinks;
/// `DELETE /drinks/{id}`
pub struct DeleteDrinks;

impl RequiredPermission for GetDrinksDetail {
    const PERMISSION: &'static str = "get:drinks-detail";
}

impl RequiredPermission for PostDrinks {
    const PERMISSION: &'static str = "post:drinks";
}

impl RequiredPermission for PatchDrinks {
    const PERMISSION: &'static str = "patch:drinks";
}

impl RequiredPermission for DeleteDrinks {
    const PERMISSION: &'static str = "delete:drinks";
}
