//! Role model and the authorization policy table.
//!
//! Every access decision in the workspace goes through [`capabilities_for`].
//! The table is a UX convenience: the backend enforces row-level security
//! independently, so a wrong answer here can hide or show a page but never
//! leak rows the backend would refuse.

use serde::{Deserialize, Deserializer, Serialize};

/// Role stored on a profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owner-level access.
    Superadmin,
    /// Full administrative access.
    Admin,
    /// Can edit site content.
    Editor,
    /// Can write blog posts through the backend, no admin panel.
    Author,
}

impl Role {
    /// All roles, highest privilege first.
    pub const ALL: [Self; 4] = [Self::Superadmin, Self::Admin, Self::Editor, Self::Author];

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Author => "author",
        }
    }

    /// Parse a role string, returning `None` for anything unrecognized.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for role strings outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "superadmin" => Ok(Self::Superadmin),
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "author" => Ok(Self::Author),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Deserialize an optional role, mapping unknown strings to `None`.
///
/// A row with a role this build does not know about must deserialize
/// successfully and then fail closed in the policy.
///
/// # Errors
///
/// Only fails if the value is neither a string nor null.
pub fn deserialize_role_lenient<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Role::parse))
}

/// A single permission checked by guards and navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Enter the admin area.
    AccessAdmin,
    /// View and change user profiles and roles.
    ManageUsers,
}

/// Derived permissions for a role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    /// May enter `/admin`.
    pub can_access_admin: bool,
    /// May see and use the users section.
    pub can_manage_users: bool,
}

impl CapabilitySet {
    /// The all-false set.
    pub const NONE: Self = Self {
        can_access_admin: false,
        can_manage_users: false,
    };

    /// Check a single capability.
    #[must_use]
    pub const fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::AccessAdmin => self.can_access_admin,
            Capability::ManageUsers => self.can_manage_users,
        }
    }
}

/// Map a role to its capabilities. Missing roles get nothing.
#[must_use]
pub const fn capabilities_for(role: Option<Role>) -> CapabilitySet {
    match role {
        Some(Role::Superadmin | Role::Admin) => CapabilitySet {
            can_access_admin: true,
            can_manage_users: true,
        },
        Some(Role::Editor) => CapabilitySet {
            can_access_admin: true,
            can_manage_users: false,
        },
        Some(Role::Author) | None => CapabilitySet::NONE,
    }
}

/// Capabilities for a raw role string as stored by the backend.
#[must_use]
pub fn capabilities_for_str(raw: Option<&str>) -> CapabilitySet {
    capabilities_for(raw.and_then(Role::parse))
}
