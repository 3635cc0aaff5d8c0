// Server-side token provider: cache window, refresh on miss, failures never cached.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

use crate::cache::token::AccessCredential;
use crate::config::oauth::OAuthConfig;
use crate::error::AuthError;
use crate::sources::oauth2::OAuth2Refresher;
use crate::sources::provider::TokenProvider;
use crate::tests::common::{literal, oauth_config};

fn provider(config: OAuthConfig) -> TokenProvider {
    let refresh_token = literal("1//long-lived");
    TokenProvider::new(OAuth2Refresher::new(Arc::new(config), 2000).unwrap(), refresh_token)
}

#[tokio::test]
async fn cached_credential_is_served_without_network() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({"access_token": "from-network"}));
    });
    let provider = provider(oauth_config(&format!("{}/token", server.base_url())));
    provider
        .cache()
        .set(AccessCredential::new("cached".into(), Utc::now() + ChronoDuration::minutes(10)))
        .await;

    let first = provider.get_access_credential().await.unwrap();
    let second = provider.get_access_credential().await.unwrap();

    assert_eq!(first.token, "cached");
    assert_eq!(second.token, "cached");
    mock.assert_calls(0);
}

#[tokio::test]
async fn empty_cache_refreshes_once_with_55_minute_window() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .body_includes("refresh_token=1%2F%2Flong-lived")
            .body_includes("grant_type=refresh_token");
        then.status(200).json_body(json!({"access_token": "ya29.fresh", "expires_in": 3600}));
    });
    let provider = provider(oauth_config(&format!("{}/token", server.base_url())));

    let credential = provider.get_access_credential().await.unwrap();
    let again = provider.get_access_credential().await.unwrap();

    mock.assert_calls(1);
    assert_eq!(credential.token, "ya29.fresh");
    assert_eq!(again, credential);
    let expected = Utc::now() + ChronoDuration::minutes(55);
    assert!((credential.expires_at - expected).num_seconds().abs() <= 2);
}

#[tokio::test]
async fn elapsed_window_triggers_exactly_one_new_refresh() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({"access_token": "short-lived", "expires_in": 2}));
    });
    let mut config = oauth_config(&format!("{}/token", server.base_url()));
    config.safety_margin_seconds = 1;
    let provider = provider(config);

    provider.get_access_credential().await.unwrap();
    provider.get_access_credential().await.unwrap();
    mock.assert_calls(1);

    tokio::time::sleep(Duration::from_millis(1200)).await;

    provider.get_access_credential().await.unwrap();
    mock.assert_calls(2);
}

#[tokio::test]
async fn failed_refresh_is_not_cached() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(400).json_body(json!({"error": "invalid_grant"}));
    });
    let provider = provider(oauth_config(&format!("{}/token", server.base_url())));
    provider
        .cache()
        .set(AccessCredential::new("stale".into(), Utc::now() - ChronoDuration::seconds(5)))
        .await;

    let err = provider.get_access_credential().await.unwrap_err();
    assert!(matches!(err, AuthError::RefreshFailed { status: 400, .. }));
    assert!(provider.cache().get().await.is_none());

    // nothing cached, so the next call retries the exchange
    assert!(provider.get_access_credential().await.is_err());
    mock.assert_calls(2);
}

#[tokio::test]
async fn lifetime_inside_safety_margin_is_not_cached() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({"access_token": "ya29.short", "expires_in": 120}));
    });
    let provider = provider(oauth_config(&format!("{}/token", server.base_url())));

    let err = provider.get_access_credential().await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidResponse(_)));
    assert!(provider.cache().get().await.is_none());
    mock.assert_calls(1);
}

#[tokio::test]
async fn missing_client_id_fails_fast() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({"access_token": "never"}));
    });
    let mut config = oauth_config(&format!("{}/token", server.base_url()));
    config.client_id = None;
    let provider = provider(config);

    let err = provider.get_access_credential().await.unwrap_err();

    assert!(matches!(err, AuthError::Configuration(_)));
    mock.assert_calls(0);
}

#[tokio::test]
async fn missing_refresh_token_fails_fast() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({"access_token": "never"}));
    });
    let refresher = OAuth2Refresher::new(Arc::new(oauth_config(&format!("{}/token", server.base_url()))), 2000).unwrap();
    let provider = TokenProvider::new(refresher, None);

    let err = provider.get_access_credential().await.unwrap_err();

    assert!(matches!(err, AuthError::Configuration(_)));
    mock.assert_calls(0);
}

#[tokio::test]
async fn clear_cache_forces_refresh() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({"access_token": "ya29.fresh"}));
    });
    let provider = provider(oauth_config(&format!("{}/token", server.base_url())));

    provider.get_access_credential().await.unwrap();
    provider.clear_cache().await;
    provider.get_access_credential().await.unwrap();

    mock.assert_calls(2);
}

#[tokio::test]
async fn independent_providers_do_not_share_cache() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200).json_body(json!({"access_token": "ya29.fresh"}));
    });
    let first = provider(oauth_config(&format!("{}/token", server.base_url())));
    let second = provider(oauth_config(&format!("{}/token", server.base_url())));

    first.get_access_credential().await.unwrap();
    second.get_access_credential().await.unwrap();
    // clones do share
    first.clone().get_access_credential().await.unwrap();

    mock.assert_calls(2);
}
