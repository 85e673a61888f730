//! Authentication and authorization.
//!
//! This module provides:
//! - The role model and the single capability policy table
//! - The session store over the external auth provider
//! - Profile resolution for a signed-in identity
//! - The route guard consumed by the admin area

/// Route guard state machine.
pub mod guard;
/// Role policy table.
pub mod policy;
/// Profile records and resolution.
pub mod profile;
/// Session store.
pub mod session;

pub use guard::{DenyReason, GuardState, Redirect, RouteGuard, SIGN_IN_PATH, SITE_ROOT_PATH};
pub use policy::{Capability, CapabilitySet, Role, capabilities_for, capabilities_for_str};
pub use profile::{Profile, ProfileResolver, ProfileSource, ProfileState};
pub use session::{
    AuthProvider, AuthSession, Identity, SessionState, SessionStore, SignUpAttributes,
    SignUpOutcome, UserId,
};

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::AuthError;
use crate::secrets::AccessToken;

/// Everything a consumer needs to decide access for one context.
///
/// Built once per request (gateway) or per command (CLI): restore the
/// session, resolve the profile, and expose the guard decision. Every
/// session change goes through this type so the profile is re-resolved
/// for the identity that is actually signed in.
pub struct AccessContext {
    session: SessionStore,
    profile: ProfileState,
    resolver: ProfileResolver,
}

impl AccessContext {
    /// Restore a session from an optional token and resolve its profile.
    pub async fn establish(
        provider: Arc<dyn AuthProvider>,
        resolver: &ProfileResolver,
        token: Option<AccessToken>,
    ) -> Self {
        let session = SessionStore::new(provider);
        session.initialize(token).await;
        let profile = resolver.resolve(&session.snapshot()).await;
        Self {
            session,
            profile,
            resolver: resolver.clone(),
        }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.session.snapshot()
    }

    /// Subscribe to session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// Profile state for the current session.
    #[must_use]
    pub const fn profile(&self) -> &ProfileState {
        &self.profile
    }

    /// Sign in and resolve the new user's profile.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; the previous session and profile stay.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        self.profile = ProfileState::Pending;
        let result = self.session.sign_in(email, password).await;
        self.refresh_profile().await;
        result
    }

    /// Create an account and resolve the profile if it signed in right away.
    ///
    /// # Errors
    ///
    /// Returns the provider's error.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        attrs: &SignUpAttributes,
    ) -> Result<SignUpOutcome, AuthError> {
        self.profile = ProfileState::Pending;
        let result = self.session.sign_up(email, password, attrs).await;
        self.refresh_profile().await;
        result
    }

    /// Sign out. The profile is dropped even when the remote call fails.
    ///
    /// # Errors
    ///
    /// Returns the provider's error after local state is already cleared.
    pub async fn sign_out(&mut self) -> Result<(), AuthError> {
        let result = self.session.sign_out().await;
        self.refresh_profile().await;
        result
    }

    /// Re-fetch the profile for the current session.
    pub async fn refresh_profile(&mut self) {
        self.profile = self.resolver.resolve(&self.session.snapshot()).await;
    }

    /// Capabilities of the current user (fail-closed).
    ///
    /// A profile that does not belong to the signed-in identity grants nothing.
    #[must_use]
    pub fn capabilities(&self) -> CapabilitySet {
        let session = self.session.snapshot();
        match (&self.profile, session.user()) {
            (ProfileState::Resolved(p), Some(user)) if p.belongs_to(user) => p.capabilities(),
            _ => CapabilitySet::NONE,
        }
    }

    /// Run a guard against this context.
    pub fn check(&self, guard: &mut RouteGuard) -> GuardState {
        guard.observe(&self.session.snapshot(), &self.profile)
    }
}

impl fmt::Debug for AccessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessContext")
            .field("session", &self.session)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}
