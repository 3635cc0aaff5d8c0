use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::{info, warn};

use crate::client::events::AuthEvents;
use crate::config::oauth::OAuthConfig;
use crate::error::AuthError;
use crate::server::server::AppState;
use crate::sources::provider::TokenProvider;
use crate::utils::constants::{DEFAULT_REFRESH_PATH, TOKEN_STATUS_PATH};

pub const LOGOUT_PATH: &str = "/api/oauth/logout";

#[derive(Clone)]
pub struct OAuthRoutesState {
    pub config: Arc<OAuthConfig>,
    pub provider: TokenProvider,
    pub events: AuthEvents,
}

impl OAuthRoutesState {
    pub fn new(config: Arc<OAuthConfig>, provider: TokenProvider, events: AuthEvents) -> Self {
        Self { config, provider, events }
    }

    pub fn router(&self) -> Router<AppState> {
        Router::new()
            .route(DEFAULT_REFRESH_PATH, post(refresh))
            .route(LOGOUT_PATH, post(logout))
            .route(TOKEN_STATUS_PATH, get(token_status))
    }
}

/// Exchange the caller's refresh cookie for a new access token, delivered as an
/// HTTP-only cookie. The configured refresh credential is never used here; it
/// belongs to the server-side provider only.
async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let oauth = &state.oauth_state;
    let Some(refresh_token) = read_cookie(&headers, &oauth.config.refresh_cookie) else {
        info!("refresh requested without a refresh token");
        return json_error(StatusCode::UNAUTHORIZED, "no refresh token");
    };

    match oauth.provider.refresh(&refresh_token).await {
        Ok(credential) => {
            let cookie = format!(
                "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
                oauth.config.access_cookie,
                credential.token,
                credential.remaining_seconds()
            );
            let Ok(cookie) = HeaderValue::from_str(&cookie) else {
                warn!("provider returned an access token that is not a valid cookie value");
                return json_error(StatusCode::BAD_GATEWAY, "unusable access token");
            };
            let mut response_headers = HeaderMap::new();
            response_headers.insert(header::SET_COOKIE, cookie);
            (
                StatusCode::OK,
                response_headers,
                Json(json!({"success": true, "expires_at": credential.expires_at.to_rfc3339()})),
            )
                .into_response()
        }
        Err(e) => json_error(status_for(&e), &e.to_string()),
    }
}

async fn logout(State(state): State<AppState>) -> Response {
    let oauth = &state.oauth_state;
    let mut response_headers = HeaderMap::new();
    for name in [&oauth.config.access_cookie, &oauth.config.refresh_cookie] {
        let expired = format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", name);
        if let Ok(value) = HeaderValue::from_str(&expired) {
            response_headers.append(header::SET_COOKIE, value);
        }
    }
    oauth.events.logout();
    (StatusCode::OK, response_headers, Json(json!({"success": true}))).into_response()
}

async fn token_status(State(state): State<AppState>) -> Response {
    let cached = state.oauth_state.provider.cache().get().await;
    Json(json!({
        "cached": cached.is_some(),
        "expires_at": cached.map(|credential| credential.expires_at.to_rfc3339()),
    }))
    .into_response()
}

fn status_for(error: &AuthError) -> StatusCode {
    match error {
        AuthError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::RefreshFailed { .. } | AuthError::InvalidResponse(_) => StatusCode::UNAUTHORIZED,
        AuthError::Network(_) => StatusCode::BAD_GATEWAY,
    }
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "error": message}))).into_response()
}

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; access_token=abc"));
        headers.append(header::COOKIE, HeaderValue::from_static("refresh_token=1//xyz=="));

        assert_eq!(read_cookie(&headers, "refresh_token"), Some("1//xyz==".to_string()));
        assert_eq!(read_cookie(&headers, "access_token"), Some("abc".to_string()));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("refresh_token="));
        assert_eq!(read_cookie(&headers, "refresh_token"), None);
    }

    #[test]
    fn error_statuses() {
        assert_eq!(status_for(&AuthError::missing("oauth client id")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(&AuthError::refresh_failed(400, "bad")), StatusCode::UNAUTHORIZED);
    }
}
