//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks URLs, token window, paths, server, http client and logging invariants

use tracing::{error, info};

use crate::config::oauth::{ClientConfig, OAuthConfig, ServiceConfig};
use crate::config::settings::SettingsConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_oauth(&cfg.oauth, &mut errors);
    validate_client(&cfg.client, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.http.timeout_ms == 0 {
        errors.push("settings.http.timeout_ms must be > 0".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!("settings.server.port '{}' is not a valid port", settings.server.port));
    }
    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!("settings.metrics.path '{}' must start with '/'", settings.metrics.path));
    }
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_oauth(oauth: &OAuthConfig, errors: &mut Vec<String>) {
    if reqwest::Url::parse(&oauth.token_url).is_err() {
        errors.push(format!("oauth.token_url '{}' is not a valid URL", oauth.token_url));
    }
    if oauth.token_ttl_seconds == 0 {
        errors.push("oauth.token_ttl_seconds must be > 0".to_string());
    }
    if oauth.safety_margin_seconds >= oauth.token_ttl_seconds {
        errors.push(format!(
            "oauth.safety_margin_seconds ({}) must be lower than oauth.token_ttl_seconds ({})",
            oauth.safety_margin_seconds, oauth.token_ttl_seconds
        ));
    }
    if oauth.refresh_cookie.trim().is_empty() {
        errors.push("oauth.refresh_cookie must not be empty".to_string());
    }
    if oauth.access_cookie.trim().is_empty() {
        errors.push("oauth.access_cookie must not be empty".to_string());
    }
}

fn validate_client(client: &ClientConfig, errors: &mut Vec<String>) {
    if reqwest::Url::parse(&client.base_url).is_err() {
        errors.push(format!("client.base_url '{}' is not a valid URL", client.base_url));
    }
    if !client.refresh_path.starts_with('/') {
        errors.push(format!("client.refresh_path '{}' must start with '/'", client.refresh_path));
    }
}
