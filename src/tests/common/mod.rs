// tests/common/mod.rs
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use reqwest::cookie::Jar;
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::client::authenticated::AuthenticatedRequestClient;
use crate::config::oauth::{ClientConfig, OAuthConfig};
use crate::config::sources::GenericSourceValue;
use crate::utils::constants::DEFAULT_REFRESH_PATH;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn literal(value: &str) -> Option<GenericSourceValue> {
    Some(GenericSourceValue::Literal { value: value.to_owned() })
}

/// OAuth config pointing at `token_url` with client id and secret set.
pub fn oauth_config(token_url: &str) -> OAuthConfig {
    let mut config = OAuthConfig::new(token_url);
    config.client_id = literal("client-123");
    config.client_secret = literal("client-secret");
    config
}

/// Request client for `addr` whose jar starts with the given cookies.
pub fn client_with_cookies(addr: SocketAddr, cookies: &[&str]) -> AuthenticatedRequestClient {
    let base_url = format!("http://{}", addr);
    let jar = Arc::new(Jar::default());
    let url = base_url.parse::<reqwest::Url>().expect("base url");
    for cookie in cookies {
        jar.add_cookie_str(&format!("{}; Path=/", cookie), &url);
    }
    let config = ClientConfig {
        base_url,
        refresh_path: DEFAULT_REFRESH_PATH.to_owned(),
    };
    AuthenticatedRequestClient::new(&config, jar, 5000).expect("request client")
}
