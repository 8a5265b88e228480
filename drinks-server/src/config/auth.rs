//! Identity provider configuration

use confique::Config;
use std::time::Duration;
use url::Url;

/// Configuration of the identity provider that issues access tokens
#[derive(Debug, Config, Clone, Default)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `tenant.eu.auth0.com`
    #[config(env = "DRINKS_AUTH_DOMAIN")]
    pub domain: String,

    /// API identifier expected in the token `aud` claim
    #[config(env = "DRINKS_AUTH_AUDIENCE")]
    pub audience: String,

    /// Client identifier of the frontend application (default: empty)
    #[config(env = "DRINKS_AUTH_CLIENT_ID", default = "")]
    pub client_id: String,

    /// Override for the published key set location
    /// (default: https://{domain}/.well-known/jwks.json)
    #[config(env = "DRINKS_AUTH_JWKS_URL")]
    pub jwks_url: Option<String>,

    /// How long a fetched key set is kept, in seconds (default: 600)
    #[config(env = "DRINKS_AUTH_JWKS_TTL", default = 600)]
    pub jwks_ttl: u64,

    /// Timeout for key set requests in seconds (default: 5)
    #[config(env = "DRINKS_AUTH_JWKS_TIMEOUT", default = 5)]
    pub jwks_timeout: u64,

    /// Minimum seconds between refreshes forced by an unknown key id (default: 30)
    #[config(env = "DRINKS_AUTH_JWKS_MIN_REFRESH", default = 30)]
    pub jwks_min_refresh: u64,

    /// Allowed clock skew for `exp` in seconds (default: 0)
    #[config(env = "DRINKS_AUTH_LEEWAY", default = 0)]
    pub leeway: u64,
}

impl AuthConfig {
    /// Issuer the identity provider stamps on its tokens
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain.trim_end_matches('/'))
    }

    /// Location of the published signing keys
    pub fn jwks_url(&self) -> Result<Url, url::ParseError> {
        match &self.jwks_url {
            Some(url) => Url::parse(url),
            None => Url::parse(&self.issuer())?.join(".well-known/jwks.json"),
        }
    }

    pub fn jwks_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_ttl)
    }

    pub fn jwks_timeout(&self) -> Duration {
        Duration::from_secs(self.jwks_timeout)
    }

    pub fn jwks_min_refresh(&self) -> Duration {
        Duration::from_secs(self.jwks_min_refresh)
    }
}
