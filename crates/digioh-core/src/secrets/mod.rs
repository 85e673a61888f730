//! Secret wrappers that keep credentials out of logs.
//!
//! - `ApiKey`: the backend's public API key
//! - `AccessToken`: a user's bearer token issued by the auth provider
//! - `scrub_secrets`: redact token-looking values from provider messages

use secrecy::{ExposeSecret, SecretBox};

/// Backend API key wrapper that prevents accidental logging.
///
/// The key is "public" in the sense that browsers may hold it, but it still
/// identifies the project and must not end up in log aggregation.
#[derive(Clone)]
pub struct ApiKey(SecretBox<str>);

impl ApiKey {
    /// Create a new API key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretBox::new(key.into().into_boxed_str()))
    }

    /// Expose the secret for actual API calls.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Bearer token for a signed-in user.
#[derive(Clone)]
pub struct AccessToken(SecretBox<str>);

impl AccessToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretBox::new(token.into().into_boxed_str()))
    }

    /// Expose the token for an outgoing request or a cookie.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the token is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for AccessToken {}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken([REDACTED])")
    }
}

/// Scrub secrets from a string (for logging and user-facing messages).
///
/// Replaces the value following each pattern with `[REDACTED]`.
#[must_use]
pub fn scrub_secrets(text: &str, patterns: &[&str]) -> String {
    let mut result = text.to_string();

    for pattern in patterns {
        let mut search_start = 0;
        while let Some(start) = result[search_start..].find(pattern) {
            let abs_start = search_start + start + pattern.len();

            let end = result[abs_start..]
                .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '&' || c == ',')
                .map_or(result.len(), |e| abs_start + e);

            result.replace_range(abs_start..end, "[REDACTED]");

            search_start = abs_start + "[REDACTED]".len();
        }
    }

    result
}

/// Patterns the auth and table APIs use for credentials.
pub const PROVIDER_SECRET_PATTERNS: &[&str] = &[
    "apikey=",
    "access_token=",
    "refresh_token=",
    "\"access_token\":\"",
    "\"refresh_token\":\"",
    "Authorization: Bearer ",
    "apikey: ",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_redaction() {
        let key = ApiKey::new("anon-public-key-12345");

        assert_eq!(format!("{key:?}"), "ApiKey([REDACTED])");
        assert_eq!(format!("{key}"), "[REDACTED]");
        assert_eq!(key.expose(), "anon-public-key-12345");
    }

    #[test]
    fn test_access_token_redaction() {
        let token = AccessToken::new("eyJhbGciOi.payload.sig");
        assert_eq!(format!("{token:?}"), "AccessToken([REDACTED])");
        assert_eq!(token.expose(), "eyJhbGciOi.payload.sig");
        assert!(!token.is_empty());
        assert!(AccessToken::new("").is_empty());
    }

    #[test]
    fn test_scrub_secrets() {
        let text = "refused: apikey=anon-123 with access_token=abc123";
        let scrubbed = scrub_secrets(text, PROVIDER_SECRET_PATTERNS);
        assert_eq!(
            scrubbed,
            "refused: apikey=[REDACTED] with access_token=[REDACTED]"
        );
    }

    #[test]
    fn test_scrub_secrets_in_json_body() {
        let text = r#"{"access_token":"eyJ.secret","token_type":"bearer"}"#;
        let scrubbed = scrub_secrets(text, PROVIDER_SECRET_PATTERNS);
        assert!(scrubbed.contains("[REDACTED]"));
        assert!(!scrubbed.contains("eyJ.secret"));
        assert!(scrubbed.contains("bearer"));
    }
}
