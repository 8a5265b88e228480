use crate::auth::{AuthError, TokenVerifier};
use crate::config::Settings;
use crate::store::{DrinkStore, Store};
use log::warn;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<Store>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(settings: Settings, store: Store) -> Result<Self, AuthError> {
        let verifier = TokenVerifier::new(&settings.auth)?;
        Ok(Self {
            settings: Arc::new(settings),
            store: Arc::new(store),
            verifier: Arc::new(verifier),
        })
    }

    /// Check if all components are healthy
    pub async fn health_check(&self) -> bool {
        let store_health = self.store.health_check().await;
        if let Err(e) = &store_health {
            warn!("Store health check failed: {e}");
        }
        let keys_health = self.verifier.keys().key_set().await;
        if let Err(e) = &keys_health {
            warn!("Signing keys health check failed: {e}");
        }
        store_health.is_ok() && keys_health.is_ok()
    }
}
