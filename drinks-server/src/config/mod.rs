pub(crate) use crate::config::auth::AuthConfig;
pub(crate) use crate::config::store::{StoreBackend, StoreConfig};
use confique::Config;

pub mod auth;
pub mod store;

/// Optional TOML file read after the environment (environment wins)
const CONFIG_FILE: &str = "drinks.toml";

/// Main configuration structure for the drinks server
#[derive(Debug, Config, Clone)]
pub struct Settings {
    /// The port the server will listen to (default: 5000)
    #[config(env = "DRINKS_PORT", default = 5000)]
    pub port: u16,

    /// Identity provider configuration
    #[config(nested)]
    pub auth: AuthConfig,

    /// Drink store configuration
    #[config(nested)]
    pub store: StoreConfig,
}

impl Settings {
    /// Loads the settings from `DRINKS_*` environment variables and `drinks.toml`
    pub fn new() -> Result<Self, confique::Error> {
        Self::builder().env().file(CONFIG_FILE).load()
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(jwks_mock: &wiremock::MockServer) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            auth: AuthConfig {
                domain: "drinks-test.eu.auth0.com".to_string(),
                audience: "drinks".to_string(),
                client_id: "test-client".to_string(),
                jwks_url: Some(format!("{}/.well-known/jwks.json", jwks_mock.uri())),
                jwks_ttl: 600,
                jwks_timeout: 2,
                jwks_min_refresh: 30,
                leeway: 0,
            },
            store: StoreConfig {
                backend: StoreBackend::InMemory,
                sqlite_path: "drinks.db".to_string(),
            },
        }
    }
}
