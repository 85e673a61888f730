//! # digiOH Core
//!
//! Domain types, authorization policy and session gating for the digiOH
//! marketing site and its admin area.
//!
//! This crate provides:
//! - Role model and the capability policy table
//! - Session store, profile resolution and the admin route guard
//! - Admin navigation derived from capabilities
//! - Site content types and the source traits the backend implements
//! - Configuration loading (JSON5) and input validation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod navigation;
pub mod notice;
pub mod secrets;
pub mod validation;

pub use auth::{
    AccessContext, AuthProvider, AuthSession, Capability, CapabilitySet, DenyReason, GuardState,
    Identity, Profile, ProfileResolver, ProfileSource, ProfileState, Redirect, Role, RouteGuard,
    SessionState, SessionStore, SignUpAttributes, SignUpOutcome, UserId, capabilities_for,
};
pub use config::{BackendCredentials, Config, ConfigError};
pub use content::{ContentSource, Scope};
pub use error::{AuthError, FetchError};
pub use navigation::{AdminSection, NavEntry, SiteRoute, admin_navigation, page_title};
pub use notice::Notice;
pub use secrets::{AccessToken, ApiKey, scrub_secrets};
pub use validation::{ContactForm, ValidationError, validate_contact, validate_credentials};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::auth::{AccessContext, CapabilitySet, Role, RouteGuard};
    pub use crate::config::Config;
    pub use crate::content::ContentSource;
    pub use crate::error::{AuthError, FetchError};
    pub use crate::navigation::AdminSection;
    pub use crate::secrets::{AccessToken, ApiKey};
}
