use super::jwks::KeySetCache;
use super::permissions::{Claims, TokenPayload};
use super::AuthError;
use crate::config::AuthConfig;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

/// Validates bearer tokens issued by the identity provider
#[derive(Clone)]
pub struct TokenVerifier {
    keys: KeySetCache,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let url = config
            .jwks_url()
            .map_err(|e| AuthError::KeySetUnavailable(format!("invalid key set url: {e}")))?;
        let keys = KeySetCache::new(
            url,
            config.jwks_ttl(),
            config.jwks_timeout(),
            config.jwks_min_refresh(),
        )?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = config.leeway;

        Ok(Self { keys, validation })
    }

    pub fn keys(&self) -> &KeySetCache {
        &self.keys
    }

    /// Checks signature, issuer, audience and expiry, then returns the claim set
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header =
            decode_header(token).map_err(|e| AuthError::TokenMalformed(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::TokenMalformed("token header has no key id".to_string()))?;

        let jwk = self.keys.find(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk).map_err(|e| {
            AuthError::TokenKeyNotFound(format!("{kid} (unusable key: {e})"))
        })?;

        let data = decode::<TokenPayload>(token, &key, &self.validation)?;
        Claims::try_from(data.claims)
    }
}
