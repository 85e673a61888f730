//! GoTrue-compatible auth API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use digioh_core::auth::{
    AuthProvider, AuthSession, Identity, SignUpAttributes, SignUpOutcome, UserId,
};
use digioh_core::error::AuthError;
use digioh_core::secrets::{AccessToken, PROVIDER_SECRET_PATTERNS, scrub_secrets};

use crate::client::{BackendClient, scrub};

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserBody> for Identity {
    fn from(user: UserBody) -> Self {
        Self {
            id: UserId::new(user.id),
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserBody,
}

impl TokenBody {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| now + chrono::Duration::seconds(secs))
            });
        AuthSession {
            identity: self.user.into(),
            access_token: AccessToken::new(self.access_token),
            expires_at,
        }
    }
}

/// Sign-up answers with a session when e-mail confirmation is off and with
/// the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session(TokenBody),
    User(UserBody),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn text(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }
}

/// Map an auth API failure to an [`AuthError`].
fn map_auth_error(status: u16, body: &str, email: Option<&str>) -> AuthError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .text()
        .map_or_else(|| body.trim().to_string(), str::to_string);
    let code = parsed.error_code.as_deref().unwrap_or_default();

    if code == "invalid_credentials"
        || parsed.error.as_deref() == Some("invalid_grant")
        || message == "Invalid login credentials"
    {
        return AuthError::InvalidCredentials;
    }
    if code == "user_already_exists" || message.contains("already registered") {
        return AuthError::AccountExists(email.unwrap_or_default().to_string());
    }
    if status == 401 || code == "session_not_found" || code == "bad_jwt" {
        return AuthError::SessionExpired;
    }

    AuthError::Provider {
        status,
        message: scrub_secrets(&message, PROVIDER_SECRET_PATTERNS),
    }
}

async fn read_error(response: Response, email: Option<&str>) -> AuthError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    map_auth_error(status, &body, email)
}

fn network(err: &reqwest::Error) -> AuthError {
    AuthError::Network(scrub(err))
}

fn decode(err: &impl std::fmt::Display) -> AuthError {
    AuthError::Provider {
        status: 200,
        message: format!("Unexpected auth response: {}", scrub(err)),
    }
}

#[async_trait]
impl AuthProvider for BackendClient {
    async fn restore(&self, token: &AccessToken) -> Result<Option<AuthSession>, AuthError> {
        let response = self
            .request(Method::GET, "/auth/v1/user", Some(token))
            .send()
            .await
            .map_err(|e| network(&e))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::debug!("Presented token is no longer valid");
                return Ok(None);
            }
            status if !status.is_success() => return Err(read_error(response, None).await),
            _ => {}
        }

        let user: UserBody = response.json().await.map_err(|e| decode(&e))?;
        Ok(Some(AuthSession {
            identity: user.into(),
            access_token: token.clone(),
            // GET /user does not report expiry; the backend rejects stale tokens.
            expires_at: None,
        }))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .request(Method::POST, "/auth/v1/token", None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| network(&e))?;

        if !response.status().is_success() {
            return Err(read_error(response, Some(email)).await);
        }

        let body: TokenBody = response.json().await.map_err(|e| decode(&e))?;
        Ok(body.into_session(Utc::now()))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attrs: &SignUpAttributes,
    ) -> Result<SignUpOutcome, AuthError> {
        let response = self
            .request(Method::POST, "/auth/v1/signup", None)
            .json(&json!({
                "email": email,
                "password": password,
                "data": {
                    "first_name": attrs.first_name,
                    "last_name": attrs.last_name,
                },
            }))
            .send()
            .await
            .map_err(|e| network(&e))?;

        if !response.status().is_success() {
            return Err(read_error(response, Some(email)).await);
        }

        match response.json().await.map_err(|e| decode(&e))? {
            SignUpBody::Session(body) => Ok(SignUpOutcome::SignedIn(body.into_session(Utc::now()))),
            SignUpBody::User(user) => {
                tracing::debug!(user_id = %user.id, "Sign-up awaiting confirmation");
                Ok(SignUpOutcome::ConfirmationRequired)
            }
        }
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        let response = self
            .request(Method::POST, "/auth/v1/logout", Some(token))
            .send()
            .await
            .map_err(|e| network(&e))?;

        // An already-dead token is as signed out as it gets.
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(read_error(response, None).await)
        }
    }
}
