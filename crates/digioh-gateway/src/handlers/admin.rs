//! Admin area. Every handler takes [`AdminAccess`], so the guard has run
//! before any data is fetched.

use axum::Json;
use axum::extract::{FromRequestParts, Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use digioh_core::auth::{Profile, Role};
use digioh_core::content::{
    BlogPost, ClientLogo, ContactSubmission, ContentSource, DashboardStats, PortfolioItem, Scope,
    Service, Table, TeamMember,
};
use digioh_core::navigation::{AdminSection, SiteRoute};
use digioh_core::notice::Notice;
use digioh_core::secrets::AccessToken;

use crate::access::{AdminAccess, AdminLayout};
use crate::error::ApiError;
use crate::server::GatewayState;

/// Data behind one admin section.
#[derive(Debug, Serialize)]
#[serde(tag = "section", content = "data", rename_all = "snake_case")]
pub enum SectionData {
    /// Content counts.
    Dashboard(DashboardStats),
    /// All services.
    Services(Vec<Service>),
    /// All portfolio items.
    Portfolio(Vec<PortfolioItem>),
    /// All team members.
    Team(Vec<TeamMember>),
    /// All client logos.
    Clients(Vec<ClientLogo>),
    /// All blog posts.
    Blog(Vec<BlogPost>),
    /// Contact submissions.
    Contact(Vec<ContactSubmission>),
    /// Profiles.
    Users(Vec<Profile>),
}

/// An admin page: layout plus section data.
#[derive(Debug, Serialize)]
pub struct AdminPage {
    layout: AdminLayout,
    #[serde(flatten)]
    data: SectionData,
    notices: Vec<Notice>,
}

/// Count every dashboard table concurrently. A failed count shows as zero.
async fn dashboard_stats(
    content: &dyn ContentSource,
    token: &AccessToken,
    notices: &mut Vec<Notice>,
) -> DashboardStats {
    let counts = join_all(
        Table::DASHBOARD
            .into_iter()
            .map(|table| async move { (table, content.count(token, table).await) }),
    )
    .await;

    let mut stats = DashboardStats::default();
    for (table, result) in counts {
        match result {
            Ok(count) => stats.set(table, count),
            Err(e) => {
                tracing::warn!(table = table.name(), "Count failed: {}", e);
                notices.push(Notice::load_failed(table.name(), &e));
            }
        }
    }
    stats
}

async fn load_section(
    content: &dyn ContentSource,
    section: AdminSection,
    token: &AccessToken,
    notices: &mut Vec<Notice>,
) -> Result<SectionData, ApiError> {
    let scope = Scope::Admin(token);
    Ok(match section {
        AdminSection::Dashboard => {
            SectionData::Dashboard(dashboard_stats(content, token, notices).await)
        }
        AdminSection::Services => SectionData::Services(content.services(scope).await?),
        AdminSection::Portfolio => SectionData::Portfolio(content.portfolio(scope, None).await?),
        AdminSection::Team => SectionData::Team(content.team(scope).await?),
        AdminSection::Clients => SectionData::Clients(content.client_logos(scope).await?),
        AdminSection::Blog => {
            SectionData::Blog(content.blog_posts(scope, chrono::Utc::now()).await?)
        }
        AdminSection::Contact => SectionData::Contact(content.contact_submissions(token).await?),
        AdminSection::Users => SectionData::Users(content.profiles(token).await?),
    })
}

async fn render(
    state: &GatewayState,
    access: &AdminAccess,
    section: AdminSection,
) -> Result<Json<AdminPage>, ApiError> {
    let mut notices = Vec::new();
    let data = load_section(state.content.as_ref(), section, &access.token, &mut notices).await?;
    Ok(Json(AdminPage {
        layout: access.layout(),
        data,
        notices,
    }))
}

fn not_visible(slug: &str) -> ApiError {
    ApiError::NotFound(format!("Admin section '{slug}'"))
}

/// `GET /admin`
pub async fn dashboard(
    State(state): State<GatewayState>,
    access: AdminAccess,
) -> Result<Json<AdminPage>, ApiError> {
    render(&state, &access, AdminSection::Dashboard).await
}

/// `GET /admin/{section}`
///
/// Sections the caller's role cannot see are reported as missing, exactly
/// as the navigation leaves them out.
pub async fn section(
    State(state): State<GatewayState>,
    access: AdminAccess,
    Path(slug): Path<String>,
) -> Result<Json<AdminPage>, ApiError> {
    let section = AdminSection::from_slug(&slug)
        .filter(|s| s.visible_to(access.capabilities))
        .ok_or_else(|| not_visible(&slug))?;
    render(&state, &access, section).await
}

/// Role change request.
#[derive(Debug, Deserialize)]
pub struct RoleChange {
    /// New role name.
    pub role: String,
}

/// `PUT /admin/users/{profile_id}/role`
pub async fn set_role(
    State(state): State<GatewayState>,
    access: AdminAccess,
    Path(profile_id): Path<String>,
    Json(change): Json<RoleChange>,
) -> Result<Json<Profile>, ApiError> {
    if !AdminSection::Users.visible_to(access.capabilities) {
        return Err(not_visible(AdminSection::Users.slug()));
    }

    let role: Role = change
        .role
        .parse()
        .map_err(|e: digioh_core::auth::policy::UnknownRole| ApiError::UnknownRole(e.0))?;

    let updated = state
        .content
        .set_role(&access.token, &profile_id, role)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile '{profile_id}'")))?;

    tracing::info!(
        actor = %access.profile.user_id,
        profile_id = %updated.id,
        role = %role,
        "Role changed"
    );
    Ok(Json(updated))
}

/// Any admin route hit with a method it does not serve.
pub async fn method_not_allowed(_access: AdminAccess) -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

/// Fallback for every unmatched path.
///
/// Paths under `/admin` pass the guard before the 404, so callers who
/// cannot open the admin area learn nothing about which routes exist.
pub async fn fallback(State(state): State<GatewayState>, request: Request) -> Response {
    let (mut parts, _body) = request.into_parts();
    let path = parts.uri.path().to_string();
    if SiteRoute::parse(&path).is_gated() {
        if let Err(rejection) = AdminAccess::from_request_parts(&mut parts, &state).await {
            return rejection;
        }
    }
    ApiError::NotFound(format!("Route '{path}'")).into_response()
}
