use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cache::token::AccessCredential;
use crate::config::oauth::OAuthConfig;
use crate::config::sources::GenericSourceValue;
use crate::error::AuthError;
use crate::helpers::time::{expires_at_from_now, get_instant};
use crate::observability::metrics::{get_metrics, OUTCOME_FAILURE, OUTCOME_SUCCESS};
use crate::utils::constants::GRANT_TYPE_REFRESH_TOKEN;

/// Trades a refresh credential for a fresh access credential.
pub trait CredentialRefresher: Send + Sync {
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<AccessCredential, AuthError>> + Send;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

/// Refresh-token grant against an OAuth2 token endpoint.
#[derive(Debug, Clone)]
pub struct OAuth2Refresher {
    client: Client,
    config: Arc<OAuthConfig>,
}

impl OAuth2Refresher {
    pub fn new(config: Arc<OAuthConfig>, timeout_ms: u64) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| AuthError::Configuration(format!("failed to build token endpoint client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn client_credentials(&self) -> Result<(String, String), AuthError> {
        let client_id = resolve_required(self.config.client_id.as_ref(), "oauth client id")?;
        let client_secret = resolve_required(self.config.client_secret.as_ref(), "oauth client secret")?;
        Ok((client_id, client_secret))
    }

    async fn exchange(&self, refresh_token: &str) -> Result<AccessCredential, AuthError> {
        let (client_id, client_secret) = self.client_credentials()?;
        if refresh_token.trim().is_empty() {
            return Err(AuthError::missing("refresh token"));
        }

        let form = [
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", GRANT_TYPE_REFRESH_TOKEN),
        ];
        debug!("requesting access token from {}", self.config.token_url);
        let response = self.client.post(&self.config.token_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::refresh_failed(status.as_u16(), &body));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(format!("malformed token response: {}", e)))?;
        let token = body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::InvalidResponse("missing access_token".to_owned()))?;

        let ttl = body.expires_in.unwrap_or(self.config.token_ttl_seconds);
        if ttl <= self.config.safety_margin_seconds {
            return Err(AuthError::InvalidResponse(format!(
                "token lifetime {}s does not exceed the {}s safety margin",
                ttl, self.config.safety_margin_seconds
            )));
        }
        let expires_at = expires_at_from_now(Utc::now(), ttl, self.config.safety_margin_seconds);
        Ok(AccessCredential::new(token, expires_at))
    }
}

fn resolve_required(source: Option<&GenericSourceValue>, what: &str) -> Result<String, AuthError> {
    match source {
        None => Err(AuthError::missing(what)),
        Some(value) => value.resolve().ok_or_else(|| {
            AuthError::Configuration(format!("{} from {} is empty or unavailable", what, value.describe()))
        }),
    }
}

impl CredentialRefresher for OAuth2Refresher {
    async fn refresh(&self, refresh_token: &str) -> Result<AccessCredential, AuthError> {
        let metrics = get_metrics().await;
        let start = get_instant();

        let result = self.exchange(refresh_token).await;
        let outcome = if result.is_ok() { OUTCOME_SUCCESS } else { OUTCOME_FAILURE };
        metrics.credential_refresh.with_label_values(&[outcome]).inc();
        metrics
            .credential_refresh_duration
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(credential) => info!("access token refreshed, usable until {}", credential.expires_at),
            Err(e) => warn!("access token refresh failed: {}", e),
        }
        result
    }
}
