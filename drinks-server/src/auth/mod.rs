//! Access token verification and permission checks.
//!
//! Tokens are RS256 JWTs issued by the hosted identity provider. The provider owns the
//! role-to-permission mapping and bakes the resulting `permissions` claim into each token,
//! so this module only answers one question per request: does the verified claim set
//! contain the permission the endpoint requires?
//!
//! ## Flow
//! - [`gate::Authorized`] pulls the bearer token out of the `Authorization` header
//! - [`verifier::TokenVerifier`] checks signature, issuer, audience and expiry against the
//!   provider's published keys, cached by [`jwks::KeySetCache`]
//! - [`permissions::check_permission`] decides allow or deny

pub mod error;
pub mod gate;
pub mod jwks;
pub mod permissions;
pub mod verifier;

pub use error::AuthError;
pub use gate::Authorized;
pub use permissions::{Claims, DeleteDrinks, GetDrinksDetail, PatchDrinks, PostDrinks};
pub use verifier::TokenVerifier;
