use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::config::sources::GenericSourceValue;
use crate::utils::constants::*;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// ================================
/// OAuth provider (server side)
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct OAuthConfig {
    #[serde(default = "default_token_url")]
    pub token_url: String,
    pub client_id: Option<GenericSourceValue>,
    pub client_secret: Option<GenericSourceValue>,
    /// long-lived credential used by the server-side token provider
    pub refresh_token: Option<GenericSourceValue>,
    #[serde(default = "default_ttl")]
    pub token_ttl_seconds: u64,
    /// a token is never handed out within this many seconds of its real expiry
    #[serde(default = "default_safety_margin")]
    pub safety_margin_seconds: u64,
    /// cookie the refresh endpoint reads the refresh credential from
    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie: String,
    #[serde(default = "default_access_cookie")]
    pub access_cookie: String,
}

impl OAuthConfig {
    pub fn new(token_url: &str) -> Self {
        Self {
            token_url: token_url.to_owned(),
            client_id: None,
            client_secret: None,
            refresh_token: None,
            token_ttl_seconds: default_ttl(),
            safety_margin_seconds: default_safety_margin(),
            refresh_cookie: default_refresh_cookie(),
            access_cookie: default_access_cookie(),
        }
    }
}

/// ================================
/// Authenticated request client
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            refresh_path: default_refresh_path(),
        }
    }
}

fn default_token_url() -> String {
    GOOGLE_TOKEN_URL.to_owned()
}

fn default_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

fn default_safety_margin() -> u64 {
    DEFAULT_SAFETY_MARGIN_SECS
}

fn default_refresh_cookie() -> String {
    REFRESH_TOKEN_COOKIE.to_owned()
}

fn default_access_cookie() -> String {
    ACCESS_TOKEN_COOKIE.to_owned()
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_owned()
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_owned()
}
