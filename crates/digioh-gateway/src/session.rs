//! Session cookie handling.
//!
//! The access token travels in an `HttpOnly` cookie; an
//! `Authorization: Bearer` header is accepted as well.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};

use digioh_core::secrets::AccessToken;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "digioh_session";

/// Value of a named cookie.
#[must_use]
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|part| part.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

/// Token from `Bearer <token>`.
#[must_use]
pub fn extract_from_header(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Access token presented with a request: the header wins over the cookie.
#[must_use]
pub fn request_token(headers: &HeaderMap) -> Option<AccessToken> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_from_header)
        .map(str::to_string);

    from_header
        .or_else(|| parse_cookie(headers, SESSION_COOKIE))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(AccessToken::new)
}

/// `Set-Cookie` value carrying a token. `None` if the token is not a valid
/// header value.
#[must_use]
pub fn set_session_cookie(
    token: &AccessToken,
    expires_at: Option<DateTime<Utc>>,
    secure: bool,
) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/",
        token.expose()
    );
    if let Some(expires_at) = expires_at {
        let max_age = (expires_at - Utc::now()).num_seconds().max(0);
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value removing the session cookie.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static(
            "digioh_session=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax; Path=/; Secure",
        )
    } else {
        HeaderValue::from_static(
            "digioh_session=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax; Path=/",
        )
    }
}
