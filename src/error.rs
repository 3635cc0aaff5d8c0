use thiserror::Error;

/// Max characters of a provider error body kept for diagnostics.
pub const ERROR_BODY_MAX_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Client id, client secret or refresh credential is missing. No request was sent.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("token refresh rejected by provider (HTTP {status}): {body}")]
    RefreshFailed { status: u16, body: String },

    #[error("token endpoint returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl AuthError {
    pub fn refresh_failed(status: u16, body: &str) -> Self {
        AuthError::RefreshFailed {
            status,
            body: truncate_chars(body, ERROR_BODY_MAX_CHARS),
        }
    }

    pub fn missing(what: &str) -> Self {
        AuthError::Configuration(format!("{} is not configured", what))
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_failed_body_is_truncated() {
        let body = "x".repeat(500);
        match AuthError::refresh_failed(400, &body) {
            AuthError::RefreshFailed { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body.chars().count(), ERROR_BODY_MAX_CHARS + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn short_body_is_kept_verbatim() {
        let err = AuthError::refresh_failed(401, "{\"error\":\"invalid_grant\"}");
        assert_eq!(
            err.to_string(),
            "token refresh rejected by provider (HTTP 401): {\"error\":\"invalid_grant\"}"
        );
    }
}
