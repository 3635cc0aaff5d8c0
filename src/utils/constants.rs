//! Shared constants and invariants

/// Provider access tokens live 60 minutes.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
/// Tokens are dropped 5 minutes ahead of real expiry, leaving a 55 minute window.
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_REFRESH_PATH: &str = "/api/oauth/refresh";
pub const TOKEN_STATUS_PATH: &str = "/api/oauth/token-status";

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";
