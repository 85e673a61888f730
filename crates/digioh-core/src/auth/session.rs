//! Session store wrapping the external auth provider.
//!
//! A [`SessionStore`] is constructed explicitly per consumer context (one per
//! HTTP request in the gateway, one per CLI invocation). It starts in the
//! loading state and is the only thing allowed to change its own state;
//! consumers read snapshots or subscribe to a `watch` channel.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::AuthError;
use crate::secrets::AccessToken;

/// Opaque user identifier issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new user ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user ID.
    pub id: UserId,
    /// E-mail the account was registered with.
    pub email: Option<String>,
}

/// A live session: identity plus the token that proves it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Who is signed in.
    pub identity: Identity,
    /// Bearer token for user-scoped backend calls.
    pub access_token: AccessToken,
    /// Token expiry, when the provider reports one.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// Whether the provider-reported expiry has passed.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Extra attributes recorded at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpAttributes {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
}

/// Outcome of a sign-up call.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Account created and signed in immediately.
    SignedIn(AuthSession),
    /// Account created; the provider wants the e-mail confirmed first.
    ConfirmationRequired,
}

/// External auth provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Confirm an existing token and return the session it belongs to.
    ///
    /// `Ok(None)` means the token is no longer valid.
    async fn restore(&self, token: &AccessToken) -> Result<Option<AuthSession>, AuthError>;

    /// Password sign-in.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Create an account.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attrs: &SignUpAttributes,
    ) -> Result<SignUpOutcome, AuthError>;

    /// Revoke a token.
    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError>;
}

/// Observable session state.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// True until the provider has confirmed the initial session.
    pub loading: bool,
    /// Current session, if any.
    pub session: Option<AuthSession>,
}

impl SessionState {
    /// The loading state every store starts in.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            loading: true,
            session: None,
        }
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn user(&self) -> Option<&Identity> {
        self.session.as_ref().map(|s| &s.identity)
    }

    /// The access token, if signed in.
    #[must_use]
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.session.as_ref().map(|s| &s.access_token)
    }
}

/// Session store.
pub struct SessionStore {
    provider: Arc<dyn AuthProvider>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Create a store in the loading state.
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self { provider, state }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolve the initial session and leave the loading state.
    ///
    /// Any failure to confirm the token is treated as "no session": the
    /// store must never stay in `loading` because the provider misbehaved.
    pub async fn initialize(&self, token: Option<AccessToken>) {
        let session = match token {
            Some(token) if !token.is_empty() => match self.provider.restore(&token).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!("Session restore failed: {}", e);
                    None
                }
            },
            _ => None,
        };

        let session = session.filter(|s| !s.is_expired_at(Utc::now()));
        self.publish(false, session);
    }

    /// Sign in with e-mail and password.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; the current session is left untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let session = self.provider.sign_in(email, password).await?;
        tracing::info!(user_id = %session.identity.id, "Signed in");
        self.publish(false, Some(session));
        Ok(())
    }

    /// Create an account, signing in if the provider allows it right away.
    ///
    /// # Errors
    ///
    /// Returns the provider's error (duplicate account, weak password, ...).
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attrs: &SignUpAttributes,
    ) -> Result<SignUpOutcome, AuthError> {
        let outcome = self.provider.sign_up(email, password, attrs).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            tracing::info!(user_id = %session.identity.id, "Signed up");
            self.publish(false, Some(session.clone()));
        } else {
            tracing::info!("Sign-up pending e-mail confirmation");
        }
        Ok(outcome)
    }

    /// Sign out.
    ///
    /// The local session is cleared before the remote call and stays
    /// cleared whatever the provider answers.
    ///
    /// # Errors
    ///
    /// Returns the provider's error after the local state is already cleared.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.state.send_replace(SessionState {
            loading: false,
            session: None,
        });

        let Some(session) = previous.session else {
            return Ok(());
        };

        match self.provider.sign_out(&session.access_token).await {
            Ok(()) => {
                tracing::info!(user_id = %session.identity.id, "Signed out");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(user_id = %session.identity.id, "Remote sign-out failed: {}", e);
                Err(e)
            }
        }
    }

    fn publish(&self, loading: bool, session: Option<AuthSession>) {
        // `send_replace` succeeds with zero receivers.
        self.state.send_replace(SessionState { loading, session });
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
