//! Site routes and admin navigation.
//!
//! The admin section table is the one place that says which capability a
//! section needs. Both the navigation filter and the gateway's section
//! dispatch read it, so a visible link always leads to a reachable page.

use serde::Serialize;

use crate::auth::{Capability, CapabilitySet};

/// Admin area sections in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminSection {
    /// Overview with content counts.
    Dashboard,
    /// Services manager.
    Services,
    /// Portfolio manager.
    Portfolio,
    /// Team manager.
    Team,
    /// Client logos manager.
    Clients,
    /// Blog manager.
    Blog,
    /// Contact form submissions.
    Contact,
    /// Profiles and roles.
    Users,
}

impl AdminSection {
    /// Every section, in menu order.
    pub const ALL: [Self; 8] = [
        Self::Dashboard,
        Self::Services,
        Self::Portfolio,
        Self::Team,
        Self::Clients,
        Self::Blog,
        Self::Contact,
        Self::Users,
    ];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Services => "Services",
            Self::Portfolio => "Portfolio",
            Self::Team => "Team",
            Self::Clients => "Clients",
            Self::Blog => "Blog",
            Self::Contact => "Contact",
            Self::Users => "Users",
        }
    }

    /// Path segment under `/admin` (empty for the dashboard).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Dashboard => "",
            Self::Services => "services",
            Self::Portfolio => "portfolio",
            Self::Team => "team",
            Self::Clients => "clients",
            Self::Blog => "blog",
            Self::Contact => "contact",
            Self::Users => "users",
        }
    }

    /// Link target.
    #[must_use]
    pub fn href(self) -> String {
        match self {
            Self::Dashboard => "/admin".to_string(),
            other => format!("/admin/{}", other.slug()),
        }
    }

    /// Capability needed to see and open this section.
    #[must_use]
    pub const fn required_capability(self) -> Capability {
        match self {
            Self::Users => Capability::ManageUsers,
            _ => Capability::AccessAdmin,
        }
    }

    /// Look up a section by its path segment.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim_matches('/');
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }

    /// Whether a user with these capabilities may open this section.
    #[must_use]
    pub const fn visible_to(self, caps: CapabilitySet) -> bool {
        caps.can_access_admin && caps.allows(self.required_capability())
    }
}

/// One entry of the admin menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    /// Section behind the link.
    pub section: AdminSection,
    /// Label.
    pub name: &'static str,
    /// Target path.
    pub href: String,
    /// Whether the entry matches the current path.
    pub active: bool,
}

/// Admin menu for a user, with the entry for `current_path` marked active.
#[must_use]
pub fn admin_navigation(caps: CapabilitySet, current_path: &str) -> Vec<NavEntry> {
    AdminSection::ALL
        .into_iter()
        .filter(|s| s.visible_to(caps))
        .map(|section| {
            let href = section.href();
            NavEntry {
                section,
                name: section.label(),
                active: is_active_path(&href, current_path),
                href,
            }
        })
        .collect()
}

/// `/admin` only matches itself; deeper entries match by prefix.
#[must_use]
pub fn is_active_path(href: &str, current_path: &str) -> bool {
    let current = normalize_path(current_path);
    if href == "/admin" {
        current == "/admin"
    } else {
        current.starts_with(href)
    }
}

/// Header title: label of the first active entry, else "Dashboard".
#[must_use]
pub fn page_title(entries: &[NavEntry]) -> &'static str {
    entries
        .iter()
        .find(|e| e.active)
        .map_or(AdminSection::Dashboard.label(), |e| e.name)
}

/// Public marketing sections on the home page, in scroll order.
pub const SITE_ANCHORS: [(&str, &str); 5] = [
    ("Home", "#home"),
    ("About", "#about"),
    ("Services", "#services"),
    ("Portfolio", "#portfolio"),
    ("Contact", "#contact"),
];

/// A request path classified against the site's route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteRoute {
    /// `/`
    Home,
    /// `/blog`
    BlogList,
    /// `/blog/{slug}`
    BlogPost(String),
    /// `/auth`
    Auth,
    /// `/admin` and `/admin/*`; `None` for an unknown section.
    Admin(Option<AdminSection>),
    /// Anything else.
    NotFound,
}

impl SiteRoute {
    /// Classify a path.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = normalize_path(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Home,
            ["blog"] => Self::BlogList,
            ["blog", slug] => Self::BlogPost((*slug).to_string()),
            ["auth"] => Self::Auth,
            ["admin"] => Self::Admin(Some(AdminSection::Dashboard)),
            ["admin", section, ..] => Self::Admin(AdminSection::from_slug(section)),
            _ => Self::NotFound,
        }
    }

    /// Whether the route sits behind the admin guard.
    #[must_use]
    pub const fn is_gated(&self) -> bool {
        matches!(self, Self::Admin(_))
    }
}

fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}
