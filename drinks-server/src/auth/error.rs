use http::StatusCode;
use thiserror::Error;

/// Reasons a request fails the authorization gate
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header is expected")]
    AuthHeaderMissing,
    #[error("authorization header must be 'Bearer <token>'")]
    AuthHeaderMalformed,
    #[error("unable to parse authentication token: {0}")]
    TokenMalformed(String),
    #[error("no published signing key matches key id '{0}'")]
    TokenKeyNotFound(String),
    #[error("token signature is invalid")]
    TokenInvalidSignature,
    #[error("token expired")]
    TokenExpired,
    #[error("incorrect claims: {0}")]
    TokenInvalidClaims(String),
    #[error("signing keys could not be loaded: {0}")]
    KeySetUnavailable(String),
    #[error("permission '{0}' is required")]
    PermissionDenied(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::KeySetUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthHeaderMissing => "AuthHeaderMissing",
            Self::AuthHeaderMalformed => "AuthHeaderMalformed",
            Self::TokenMalformed(_) => "TokenMalformed",
            Self::TokenKeyNotFound(_) => "TokenKeyNotFound",
            Self::TokenInvalidSignature => "TokenInvalidSignature",
            Self::TokenExpired => "TokenExpired",
            Self::TokenInvalidClaims(_) => "TokenInvalidClaims",
            Self::KeySetUnavailable(_) => "KeySetUnavailable",
            Self::PermissionDenied(_) => "PermissionDenied",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidSignature => Self::TokenInvalidSignature,
            ErrorKind::InvalidIssuer => Self::TokenInvalidClaims("invalid issuer".to_string()),
            ErrorKind::InvalidAudience => Self::TokenInvalidClaims("invalid audience".to_string()),
            ErrorKind::ImmatureSignature => {
                Self::TokenInvalidClaims("token is not valid yet".to_string())
            }
            ErrorKind::MissingRequiredClaim(claim) => {
                Self::TokenInvalidClaims(format!("missing required claim '{claim}'"))
            }
            // The signature checked out but the payload does not fit the claim set
            ErrorKind::Json(e) => Self::TokenInvalidClaims(format!("unexpected claim type: {e}")),
            _ => Self::TokenMalformed(err.to_string()),
        }
    }
}
