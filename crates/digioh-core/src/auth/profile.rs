//! Profile records and their resolution for a session.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::policy::{CapabilitySet, Role, capabilities_for, deserialize_role_lenient};
use super::session::{Identity, SessionState, UserId};
use crate::error::FetchError;
use crate::secrets::AccessToken;

/// Application-level record attaching a role to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Row ID.
    pub id: String,
    /// Owning identity.
    pub user_id: UserId,
    /// Contact e-mail.
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Role; `None` when missing or not one this build understands.
    #[serde(default, deserialize_with = "deserialize_role_lenient")]
    pub role: Option<Role>,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Capabilities granted by this profile's role.
    #[must_use]
    pub const fn capabilities(&self) -> CapabilitySet {
        capabilities_for(self.role)
    }

    /// "First Last", or the e-mail when no name is set.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }

    /// Single uppercase letter for the avatar badge.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        self.first_name
            .as_deref()
            .and_then(|n| n.chars().next())
            .or_else(|| self.email.chars().next())
            .map(|c| c.to_ascii_uppercase())
    }

    /// Whether this profile belongs to the given identity.
    #[must_use]
    pub fn belongs_to(&self, identity: &Identity) -> bool {
        self.user_id == identity.id
    }
}

/// Source of profile rows.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the profile owned by `user_id`, using the user's own token.
    async fn profile_for(
        &self,
        user_id: &UserId,
        token: &AccessToken,
    ) -> Result<Option<Profile>, FetchError>;
}

/// Resolution state of the current user's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileState {
    /// Session still loading, nothing fetched yet.
    Pending,
    /// No signed-in user.
    Anonymous,
    /// Signed in but no (matching) profile row.
    Missing,
    /// Profile loaded.
    Resolved(Profile),
    /// Fetch failed.
    Failed(FetchError),
}

impl ProfileState {
    /// The resolved profile, if any.
    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Resolved(p) => Some(p),
            _ => None,
        }
    }

    /// Capabilities for this state. Everything but `Resolved` grants nothing.
    #[must_use]
    pub const fn capabilities(&self) -> CapabilitySet {
        match self {
            Self::Resolved(p) => p.capabilities(),
            _ => CapabilitySet::NONE,
        }
    }
}

/// Fetches the profile for a session.
#[derive(Clone)]
pub struct ProfileResolver {
    source: Arc<dyn ProfileSource>,
}

impl ProfileResolver {
    /// Create a resolver over a profile source.
    #[must_use]
    pub fn new(source: Arc<dyn ProfileSource>) -> Self {
        Self { source }
    }

    /// Resolve the profile for the given session state.
    pub async fn resolve(&self, session: &SessionState) -> ProfileState {
        if session.loading {
            return ProfileState::Pending;
        }
        let Some(auth) = session.session.as_ref() else {
            return ProfileState::Anonymous;
        };

        match self
            .source
            .profile_for(&auth.identity.id, &auth.access_token)
            .await
        {
            Ok(Some(profile)) if profile.belongs_to(&auth.identity) => {
                ProfileState::Resolved(profile)
            }
            Ok(Some(profile)) => {
                tracing::warn!(
                    profile_id = %profile.id,
                    user_id = %auth.identity.id,
                    "Ignoring profile owned by another identity"
                );
                ProfileState::Missing
            }
            Ok(None) => {
                tracing::debug!(user_id = %auth.identity.id, "No profile provisioned");
                ProfileState::Missing
            }
            Err(e) => {
                tracing::warn!(user_id = %auth.identity.id, "Profile fetch failed: {}", e);
                ProfileState::Failed(e)
            }
        }
    }
}

impl std::fmt::Debug for ProfileResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileResolver").finish_non_exhaustive()
    }
}
