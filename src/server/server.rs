use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use crate::client::events::AuthEvents;
use crate::config::oauth::ServiceConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::routes::OAuthRoutesState;
use crate::sources::oauth2::OAuth2Refresher;
use crate::sources::provider::TokenProvider;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub oauth_state: OAuthRoutesState,
}

impl AppState {
    pub fn new(metrics: &Metrics, oauth_state: OAuthRoutesState) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            oauth_state,
        }
    }

    /// Wire provider, refresher and event bus from config.
    pub fn from_config(metrics: &Metrics, service_config: &ServiceConfig, events: AuthEvents) -> Result<Self> {
        let oauth_config = Arc::new(service_config.oauth.clone());
        let refresher = OAuth2Refresher::new(oauth_config.clone(), service_config.settings.http.timeout_ms)
            .context("failed to build token endpoint client")?;
        let provider = TokenProvider::new(refresher, oauth_config.refresh_token.clone());
        Ok(Self::new(metrics, OAuthRoutesState::new(oauth_config, provider, events)))
    }
}

pub fn router(service_config: &ServiceConfig, state: AppState) -> Router {
    Router::new()
        .merge(state.metrics_state.router(&service_config.settings.metrics))
        .merge(state.oauth_state.router())
        .with_state(state)
}

/// Start the refresh endpoint service; returns once a shutdown signal arrives.
pub async fn start(service_config: &ServiceConfig, events: AuthEvents) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::from_config(metrics, service_config, events)?;
    let app = router(service_config, state);

    let server = &service_config.settings.server;
    let bind_addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("listening on {}", bind_addr);
    metrics.up.set(1);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    metrics.up.set(0);
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
