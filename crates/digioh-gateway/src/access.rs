//! Request extractors that establish who is calling.

use axum::Json;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;
use serde_json::json;

use digioh_core::auth::{AccessContext, CapabilitySet, GuardState, Profile, RouteGuard};
use digioh_core::navigation::{NavEntry, admin_navigation, page_title};
use digioh_core::secrets::AccessToken;

use crate::server::GatewayState;
use crate::session::request_token;

/// Session context for any request, signed in or not.
#[derive(Debug)]
pub struct Visitor(pub AccessContext);

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
    GatewayState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = GatewayState::from_ref(state);
        let token = request_token(&parts.headers);
        let ctx = AccessContext::establish(state.auth.clone(), &state.profiles, token).await;
        Ok(Self(ctx))
    }
}

/// A caller allowed into the admin area.
///
/// Rejects with `303 See Other` to `/auth` for anonymous callers and to `/`
/// for everyone else the guard turns away.
#[derive(Debug)]
pub struct AdminAccess {
    /// Resolved profile.
    pub profile: Profile,
    /// The caller's token, for row-level-secured reads.
    pub token: AccessToken,
    /// Capabilities from the profile's role.
    pub capabilities: CapabilitySet,
    /// Path the request was made to.
    pub path: String,
}

impl AdminAccess {
    /// Layout shared by every admin page.
    #[must_use]
    pub fn layout(&self) -> AdminLayout {
        let navigation = admin_navigation(self.capabilities, &self.path);
        AdminLayout {
            title: page_title(&navigation),
            navigation,
            profile: ProfileSummary {
                display_name: self.profile.display_name(),
                initial: self.profile.initial(),
                email: self.profile.email.clone(),
                role: self.profile.role.map(|r| r.as_str()),
            },
        }
    }
}

/// Navigation, title and current-user badge.
#[derive(Debug, Serialize)]
pub struct AdminLayout {
    /// Header title.
    pub title: &'static str,
    /// Visible menu entries.
    pub navigation: Vec<NavEntry>,
    /// Signed-in user.
    pub profile: ProfileSummary,
}

/// Current user as shown in the admin header.
#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    /// Name or e-mail.
    pub display_name: String,
    /// Avatar letter.
    pub initial: Option<char>,
    /// E-mail.
    pub email: String,
    /// Role name.
    pub role: Option<&'static str>,
}

impl<S> FromRequestParts<S> for AdminAccess
where
    S: Send + Sync,
    GatewayState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(Visitor(ctx)) = Visitor::from_request_parts(parts, state).await;
        let path = parts.uri.path().to_string();

        let mut guard = RouteGuard::admin();
        match ctx.check(&mut guard) {
            GuardState::Allowed => {}
            GuardState::Denied(reason) => {
                let target = reason.redirect().path();
                tracing::info!(path = %path, ?reason, target, "Admin access denied");
                return Err(Redirect::to(target).into_response());
            }
            GuardState::Pending => {
                return Err((
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "Session still loading", "code": "pending" })),
                )
                    .into_response());
            }
        }

        let capabilities = ctx.capabilities();
        let session = ctx.snapshot();
        match (ctx.profile().profile(), session.access_token()) {
            (Some(profile), Some(token)) => Ok(Self {
                profile: profile.clone(),
                token: token.clone(),
                capabilities,
                path,
            }),
            _ => Err(Redirect::to(digioh_core::auth::SIGN_IN_PATH).into_response()),
        }
    }
}
