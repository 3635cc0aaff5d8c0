use std::sync::Arc;

use tracing::debug;

use crate::cache::token::AccessCredential;
use crate::cache::token_cache::TokenCache;
use crate::config::sources::GenericSourceValue;
use crate::error::AuthError;
use crate::observability::metrics::get_metrics;
use crate::sources::oauth2::{CredentialRefresher, OAuth2Refresher};

/// Hands out a valid access credential, refreshing through `R` when the cache
/// is empty or past its window. Failed refreshes are never cached.
#[derive(Debug)]
pub struct TokenProvider<R = OAuth2Refresher> {
    cache: TokenCache,
    refresher: Arc<R>,
    refresh_token: Option<GenericSourceValue>,
}

impl<R> Clone for TokenProvider<R> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            refresher: self.refresher.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

impl<R: CredentialRefresher> TokenProvider<R> {
    pub fn new(refresher: R, refresh_token: Option<GenericSourceValue>) -> Self {
        Self {
            cache: TokenCache::new(),
            refresher: Arc::new(refresher),
            refresh_token,
        }
    }

    pub async fn get_access_credential(&self) -> Result<AccessCredential, AuthError> {
        let metrics = get_metrics().await;
        if let Some(credential) = self.cache.get().await {
            metrics.token_cache_hits.inc();
            debug!("access token served from cache, usable until {}", credential.expires_at);
            return Ok(credential);
        }
        metrics.token_cache_misses.inc();

        let refresh_token = self
            .refresh_token
            .as_ref()
            .and_then(|value| value.resolve())
            .ok_or_else(|| AuthError::missing("refresh token"))?;

        let credential = self.refresher.refresh(&refresh_token).await?;
        self.cache.set(credential.clone()).await;
        Ok(credential)
    }

    /// Exchange a caller-supplied refresh credential, bypassing the cache.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessCredential, AuthError> {
        self.refresher.refresh(refresh_token).await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }
}
