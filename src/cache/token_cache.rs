use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::cache::token::AccessCredential;

/// Single-entry access credential cache.
///
/// Clones share the same entry. An entry past its `expires_at` is never returned,
/// so an expired credential behaves exactly like an empty cache.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<Option<AccessCredential>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get credential if it exists and is not expired
    pub async fn get(&self) -> Option<AccessCredential> {
        let now = Utc::now();
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|credential| credential.is_valid_at(now))
            .cloned()
    }

    pub async fn set(&self, credential: AccessCredential) {
        *self.inner.write().await = Some(credential);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}
