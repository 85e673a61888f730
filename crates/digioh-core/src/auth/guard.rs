//! Route guard state machine.

use serde::Serialize;

use super::policy::Capability;
use super::profile::ProfileState;
use super::session::SessionState;

/// Sign-in surface.
pub const SIGN_IN_PATH: &str = "/auth";
/// Public site root.
pub const SITE_ROOT_PATH: &str = "/";

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Nobody is signed in.
    Unauthenticated,
    /// Signed in, no profile row.
    MissingProfile,
    /// Signed in, profile could not be fetched.
    ProfileUnavailable,
    /// Signed in, role lacks the capability.
    InsufficientRole,
}

impl DenyReason {
    /// Where a denied request is sent.
    #[must_use]
    pub const fn redirect(self) -> Redirect {
        match self {
            Self::Unauthenticated => Redirect::SignIn,
            Self::MissingProfile | Self::ProfileUnavailable | Self::InsufficientRole => {
                Redirect::SiteRoot
            }
        }
    }
}

/// Redirect target for a denied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Redirect {
    /// `/auth`
    SignIn,
    /// `/`
    SiteRoot,
}

impl Redirect {
    /// Target path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SignIn => SIGN_IN_PATH,
            Self::SiteRoot => SITE_ROOT_PATH,
        }
    }
}

/// Guard decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum GuardState {
    /// Session or profile still loading; render nothing access-dependent.
    Pending,
    /// Access refused.
    Denied(DenyReason),
    /// Access granted.
    Allowed,
}

impl GuardState {
    /// Whether access is granted.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Redirect to issue, for a denied state.
    #[must_use]
    pub const fn redirect(self) -> Option<Redirect> {
        match self {
            Self::Denied(reason) => Some(reason.redirect()),
            _ => None,
        }
    }
}

/// Evaluate a capability requirement against session and profile state.
#[must_use]
pub fn evaluate(session: &SessionState, profile: &ProfileState, required: Capability) -> GuardState {
    if session.loading {
        return GuardState::Pending;
    }
    let Some(user) = session.user() else {
        return GuardState::Denied(DenyReason::Unauthenticated);
    };

    match profile {
        // The profile state can lag the session (e.g. right after sign-in).
        ProfileState::Pending | ProfileState::Anonymous => GuardState::Pending,
        ProfileState::Missing => GuardState::Denied(DenyReason::MissingProfile),
        ProfileState::Failed(_) => GuardState::Denied(DenyReason::ProfileUnavailable),
        // A profile fetched for someone else never grants anything.
        ProfileState::Resolved(p) if !p.belongs_to(user) => {
            GuardState::Denied(DenyReason::MissingProfile)
        }
        ProfileState::Resolved(p) => {
            if p.capabilities().allows(required) {
                GuardState::Allowed
            } else {
                GuardState::Denied(DenyReason::InsufficientRole)
            }
        }
    }
}

/// Guard for one protected area.
///
/// The state is recomputed from scratch on every [`observe`](Self::observe);
/// nothing about a previous `Allowed` survives a sign-out or a downgrade.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    required: Capability,
    state: GuardState,
}

impl RouteGuard {
    /// Guard requiring the given capability.
    #[must_use]
    pub const fn new(required: Capability) -> Self {
        Self {
            required,
            state: GuardState::Pending,
        }
    }

    /// Guard for the admin area.
    #[must_use]
    pub const fn admin() -> Self {
        Self::new(Capability::AccessAdmin)
    }

    /// Capability this guard checks.
    #[must_use]
    pub const fn required(&self) -> Capability {
        self.required
    }

    /// Last evaluated state.
    #[must_use]
    pub const fn state(&self) -> GuardState {
        self.state
    }

    /// Re-evaluate against fresh state.
    pub fn observe(&mut self, session: &SessionState, profile: &ProfileState) -> GuardState {
        let next = evaluate(session, profile, self.required);
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "Route guard transition");
        }
        self.state = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::policy::Role;
    use crate::auth::profile::testing::profile;
    use crate::auth::session::{AuthSession, Identity, UserId};
    use crate::error::FetchError;
    use crate::secrets::AccessToken;

    fn anonymous() -> SessionState {
        SessionState {
            loading: false,
            session: None,
        }
    }

    fn signed_in() -> SessionState {
        SessionState {
            loading: false,
            session: Some(AuthSession {
                identity: Identity {
                    id: UserId::new("u1"),
                    email: None,
                },
                access_token: AccessToken::new("t"),
                expires_at: None,
            }),
        }
    }

    fn resolved(role: Option<Role>) -> ProfileState {
        ProfileState::Resolved(profile("u1", role))
    }

    #[test]
    fn test_never_allowed_while_loading() {
        let loading = SessionState::initial();
        for role in Role::ALL {
            assert_eq!(
                evaluate(&loading, &resolved(Some(role)), Capability::AccessAdmin),
                GuardState::Pending
            );
        }
        // Even a stale session in the loading state stays pending.
        let mut stale = signed_in();
        stale.loading = true;
        assert_eq!(
            evaluate(&stale, &resolved(Some(Role::Superadmin)), Capability::AccessAdmin),
            GuardState::Pending
        );
    }

    #[test]
    fn test_unauthenticated_goes_to_sign_in() {
        let state = evaluate(&anonymous(), &ProfileState::Anonymous, Capability::AccessAdmin);
        assert_eq!(state, GuardState::Denied(DenyReason::Unauthenticated));
        assert_eq!(state.redirect(), Some(Redirect::SignIn));
        assert_eq!(state.redirect().unwrap().path(), "/auth");
    }

    #[test]
    fn test_author_goes_to_root() {
        let state = evaluate(&signed_in(), &resolved(Some(Role::Author)), Capability::AccessAdmin);
        assert_eq!(state, GuardState::Denied(DenyReason::InsufficientRole));
        assert_eq!(state.redirect().unwrap().path(), "/");
    }

    #[test]
    fn test_admin_tier_allowed() {
        for role in [Role::Superadmin, Role::Admin, Role::Editor] {
            assert!(
                evaluate(&signed_in(), &resolved(Some(role)), Capability::AccessAdmin)
                    .is_allowed()
            );
        }
    }

    #[test]
    fn test_editor_denied_user_management() {
        let state = evaluate(&signed_in(), &resolved(Some(Role::Editor)), Capability::ManageUsers);
        assert_eq!(state, GuardState::Denied(DenyReason::InsufficientRole));
    }

    #[test]
    fn test_profile_fetch_failure_denies() {
        let failed = ProfileState::Failed(FetchError::Network("reset".to_string()));
        let state = evaluate(&signed_in(), &failed, Capability::AccessAdmin);
        assert_eq!(state, GuardState::Denied(DenyReason::ProfileUnavailable));
        assert_eq!(state.redirect(), Some(Redirect::SiteRoot));
    }

    #[test]
    fn test_missing_profile_and_unknown_role_deny() {
        assert_eq!(
            evaluate(&signed_in(), &ProfileState::Missing, Capability::AccessAdmin),
            GuardState::Denied(DenyReason::MissingProfile)
        );
        assert_eq!(
            evaluate(&signed_in(), &resolved(None), Capability::AccessAdmin),
            GuardState::Denied(DenyReason::InsufficientRole)
        );
    }

    #[test]
    fn test_profile_of_another_user_denies() {
        let stale = ProfileState::Resolved(profile("u2", Some(Role::Superadmin)));
        let state = evaluate(&signed_in(), &stale, Capability::AccessAdmin);
        assert_eq!(state, GuardState::Denied(DenyReason::MissingProfile));
        assert_eq!(
            evaluate(&signed_in(), &stale, Capability::ManageUsers),
            GuardState::Denied(DenyReason::MissingProfile)
        );
    }

    #[test]
    fn test_anonymous_profile_with_live_session_waits() {
        assert_eq!(
            evaluate(&signed_in(), &ProfileState::Anonymous, Capability::AccessAdmin),
            GuardState::Pending
        );
    }

    #[test]
    fn test_allowed_is_not_sticky() {
        let mut guard = RouteGuard::admin();
        assert_eq!(guard.state(), GuardState::Pending);

        assert!(guard.observe(&signed_in(), &resolved(Some(Role::Admin))).is_allowed());

        // Role downgraded on the backend.
        assert_eq!(
            guard.observe(&signed_in(), &resolved(Some(Role::Author))),
            GuardState::Denied(DenyReason::InsufficientRole)
        );

        assert!(guard.observe(&signed_in(), &resolved(Some(Role::Admin))).is_allowed());

        // Signed out.
        assert_eq!(
            guard.observe(&anonymous(), &ProfileState::Anonymous),
            GuardState::Denied(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(GuardState::Denied(DenyReason::InsufficientRole)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "denied", "reason": "insufficient_role"})
        );
    }
}
