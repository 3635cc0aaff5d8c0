use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, info, warn};

use crate::client::request::RequestOptions;
use crate::client::single_flight::SingleFlight;
use crate::config::oauth::ClientConfig;
use crate::error::AuthError;
use crate::observability::metrics::{get_metrics, OUTCOME_FAILURE, OUTCOME_SUCCESS};

/// HTTP client that recovers from one expired session per call.
///
/// Every request, the refresh call and the retry carry the cookies in `jar`.
/// On a 401 the client joins (or starts) the single in-flight refresh, then
/// replays the request once with `skip_auth_retry` set. If the refresh fails
/// the original 401 is returned; no logout is triggered from here.
#[derive(Clone)]
pub struct AuthenticatedRequestClient {
    client: Client,
    base_url: Url,
    refresh_url: Url,
    refresh: SingleFlight,
}

impl AuthenticatedRequestClient {
    pub fn new(config: &ClientConfig, jar: Arc<Jar>, timeout_ms: u64) -> Result<Self, AuthError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AuthError::Configuration(format!("invalid client.base_url: {}", e)))?;
        let refresh_url = base_url
            .join(&config.refresh_path)
            .map_err(|e| AuthError::Configuration(format!("invalid client.refresh_path: {}", e)))?;
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| AuthError::Configuration(format!("failed to build request client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            refresh_url,
            refresh: SingleFlight::new(),
        })
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_in_flight()
    }

    /// Send `options` to `target` (absolute URL or path on `base_url`).
    ///
    /// Only a 401 is acted on; every other status comes back untouched.
    pub async fn request(&self, target: &str, options: RequestOptions) -> Result<Response, AuthError> {
        let url = self.resolve(target)?;
        let response = self.send(&url, &options).await?;

        if response.status() != StatusCode::UNAUTHORIZED || options.skip_auth_retry {
            return Ok(response);
        }

        debug!("{} {} returned 401, refreshing session", options.method, url.path());
        if !self.refresh_session().await {
            info!("session refresh failed, returning original 401 for {}", url.path());
            return Ok(response);
        }

        get_metrics().await.client_auth_retries.inc();
        let retry = RequestOptions {
            skip_auth_retry: true,
            ..options
        };
        self.send(&url, &retry).await
    }

    /// Wait for the shared refresh outcome, starting the refresh if none is in flight.
    pub async fn refresh_session(&self) -> bool {
        let (pending, started) = self.refresh.join_or_start(|| {
            call_refresh_endpoint(self.client.clone(), self.refresh_url.clone())
        });
        if started {
            debug!("started session refresh via {}", self.refresh_url.path());
        } else {
            debug!("joined in-flight session refresh");
        }
        pending.await
    }

    fn resolve(&self, target: &str) -> Result<Url, AuthError> {
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(_) => self
                .base_url
                .join(target)
                .map_err(|e| AuthError::Configuration(format!("invalid request target '{}': {}", target, e))),
        }
    }

    async fn send(&self, url: &Url, options: &RequestOptions) -> Result<Response, AuthError> {
        let mut request = self
            .client
            .request(options.method.clone(), url.clone())
            .headers(options.headers.clone());
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }
        Ok(request.send().await?)
    }
}

/// Any 2xx counts as refreshed; errors never escape, they turn into `false`.
async fn call_refresh_endpoint(client: Client, refresh_url: Url) -> bool {
    let metrics = get_metrics().await;
    let refreshed = match client.post(refresh_url).send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            warn!("session refresh rejected: {}", response.status());
            false
        }
        Err(e) => {
            warn!("session refresh request failed: {}", e);
            false
        }
    };
    let outcome = if refreshed { OUTCOME_SUCCESS } else { OUTCOME_FAILURE };
    metrics.client_refresh.with_label_values(&[outcome]).inc();
    refreshed
}
