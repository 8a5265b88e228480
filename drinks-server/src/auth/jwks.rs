use super::AuthError;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use log::{debug, error, info, warn};
use moka::future::Cache as MokaCache;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

/// Process-wide cache of the identity provider's published signing keys.
///
/// Holds a single entry that expires after the configured TTL. Concurrent requests
/// that find the entry missing share one fetch. A key id that is absent from the
/// cached set forces one refetch, which picks up rotated keys, but only once
/// `min_refresh` has passed since the previous fetch. Unknown key ids inside that
/// window are answered from the cached set.
#[derive(Clone)]
pub struct KeySetCache {
    url: Url,
    client: Client,
    cache: MokaCache<(), Arc<JwkSet>>,
    min_refresh: Duration,
    last_fetch: Arc<Mutex<Option<Instant>>>,
}

impl KeySetCache {
    pub fn new(
        url: Url,
        ttl: Duration,
        timeout: Duration,
        min_refresh: Duration,
    ) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(format!("failed to build client: {e}")))?;

        let cache = MokaCache::builder()
            .max_capacity(1)
            .time_to_live(ttl)
            .build();

        Ok(Self {
            url,
            client,
            cache,
            min_refresh,
            last_fetch: Arc::new(Mutex::new(None)),
        })
    }

    /// Returns the cached key set, fetching it if absent or expired
    pub async fn key_set(&self) -> Result<Arc<JwkSet>, AuthError> {
        self.cache
            .try_get_with((), self.fetch())
            .await
            .map_err(|e: Arc<AuthError>| (*e).clone())
    }

    /// Looks up the key with the given id, refreshing the set on a miss when allowed
    pub async fn find(&self, kid: &str) -> Result<Jwk, AuthError> {
        if let Some(jwk) = self.key_set().await?.find(kid) {
            return Ok(jwk.clone());
        }

        if !self.claim_refresh().await {
            debug!("Key id '{kid}' not in cached key set, refresh not due yet");
            return Err(AuthError::TokenKeyNotFound(kid.to_string()));
        }

        debug!("Key id '{kid}' not in cached key set, refreshing");
        self.cache.invalidate(&()).await;
        self.key_set()
            .await?
            .find(kid)
            .cloned()
            .ok_or_else(|| AuthError::TokenKeyNotFound(kid.to_string()))
    }

    /// Reserves the next forced refresh if `min_refresh` has passed since the last fetch
    async fn claim_refresh(&self) -> bool {
        let mut last_fetch = self.last_fetch.lock().await;
        match *last_fetch {
            Some(at) if at.elapsed() < self.min_refresh => false,
            _ => {
                *last_fetch = Some(Instant::now());
                true
            }
        }
    }

    async fn fetch(&self) -> Result<Arc<JwkSet>, AuthError> {
        *self.last_fetch.lock().await = Some(Instant::now());

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                error!("Failed to fetch signing keys from {}: {}", self.url, e);
                AuthError::KeySetUnavailable(e.to_string())
            })?;

        let key_set: JwkSet = response.json().await.map_err(|e| {
            error!("Invalid key set returned by {}: {}", self.url, e);
            AuthError::KeySetUnavailable(e.to_string())
        })?;

        if key_set.keys.is_empty() {
            warn!("Key set at {} contains no keys", self.url);
        }
        info!(
            "Loaded {} signing key(s) from {}",
            key_set.keys.len(),
            self.url
        );
        Ok(Arc::new(key_set))
    }
}
