//! Public site routes. None of these look at the session.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use digioh_core::content::{
    BlogPost, ClientLogo, PortfolioCategory, PortfolioItem, Scope, Service, TeamMember,
};
use digioh_core::error::FetchError;
use digioh_core::navigation::SITE_ANCHORS;
use digioh_core::notice::Notice;
use digioh_core::validation::{ContactForm, validate_contact};

use crate::error::ApiError;
use crate::server::GatewayState;

/// A headline figure in the hero section.
#[derive(Debug, Serialize)]
pub struct HeroStat {
    /// Figure.
    pub value: &'static str,
    /// Caption.
    pub label: &'static str,
}

/// Static hero section.
#[derive(Debug, Serialize)]
pub struct Hero {
    badge: &'static str,
    headline: &'static str,
    subheading: &'static str,
    calls_to_action: [(&'static str, &'static str); 2],
    stats: [HeroStat; 4],
}

static HERO: Hero = Hero {
    badge: "500+ successful events since 2015",
    headline: "Digital Events Redefined",
    subheading: "We create unforgettable digital experiences that connect, engage, and inspire \
                 your audience through cutting-edge technology and creative excellence.",
    calls_to_action: [
        ("Start Your Project", "#contact"),
        ("Watch Our Work", "#portfolio"),
    ],
    stats: [
        HeroStat {
            value: "500+",
            label: "Events Delivered",
        },
        HeroStat {
            value: "9",
            label: "Years Experience",
        },
        HeroStat {
            value: "100%",
            label: "Client Satisfaction",
        },
        HeroStat {
            value: "24/7",
            label: "Support",
        },
    ],
};

/// Home page payload.
#[derive(Debug, Serialize)]
pub struct HomePage {
    hero: &'static Hero,
    anchors: Vec<Anchor>,
    services: Vec<Service>,
    portfolio: Vec<PortfolioItem>,
    categories: Vec<PortfolioCategory>,
    team: Vec<TeamMember>,
    clients: Vec<ClientLogo>,
    notices: Vec<Notice>,
}

/// In-page navigation link.
#[derive(Debug, Serialize)]
pub struct Anchor {
    name: &'static str,
    href: &'static str,
}

/// `GET /` query.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Portfolio category slug.
    pub category: Option<String>,
}

/// Keep a loaded section or record why it is empty.
pub(crate) fn or_notice<T>(
    result: Result<Vec<T>, FetchError>,
    what: &str,
    notices: &mut Vec<Notice>,
) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(section = what, "Section failed to load: {}", e);
        notices.push(Notice::load_failed(what, &e));
        Vec::new()
    })
}

/// `GET /`
pub async fn home(
    State(state): State<GatewayState>,
    Query(query): Query<HomeQuery>,
) -> Json<HomePage> {
    let content = &state.content;
    let (services, portfolio, categories, team, clients) = tokio::join!(
        content.services(Scope::Public),
        content.portfolio(Scope::Public, query.category.as_deref()),
        content.portfolio_categories(),
        content.team(Scope::Public),
        content.client_logos(Scope::Public),
    );

    let mut notices = Vec::new();
    Json(HomePage {
        hero: &HERO,
        anchors: SITE_ANCHORS
            .iter()
            .map(|&(name, href)| Anchor { name, href })
            .collect(),
        services: or_notice(services, "services", &mut notices),
        portfolio: or_notice(portfolio, "portfolio", &mut notices),
        categories: or_notice(categories, "portfolio categories", &mut notices),
        team: or_notice(team, "team", &mut notices),
        clients: or_notice(clients, "client logos", &mut notices),
        notices,
    })
}

/// Blog index payload.
#[derive(Debug, Serialize)]
pub struct BlogIndex {
    posts: Vec<BlogPost>,
    notices: Vec<Notice>,
}

/// `GET /blog`
pub async fn blog_list(State(state): State<GatewayState>) -> Json<BlogIndex> {
    let mut notices = Vec::new();
    let posts = state.content.blog_posts(Scope::Public, Utc::now()).await;
    Json(BlogIndex {
        posts: or_notice(posts, "blog posts", &mut notices),
        notices,
    })
}

/// `GET /blog/{slug}`
pub async fn blog_post(
    State(state): State<GatewayState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    state
        .content
        .blog_post(&slug, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Post '{slug}'")))
}

/// Contact form outcome.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    notice: Notice,
}

/// `POST /contact`
pub async fn contact(
    State(state): State<GatewayState>,
    Json(form): Json<ContactForm>,
) -> (StatusCode, Json<ContactResponse>) {
    let submission = match validate_contact(&form) {
        Ok(submission) => submission,
        Err(e) => {
            tracing::debug!("Contact form rejected: {}", e);
            let notice = Notice::failure("Error", e.to_string());
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(ContactResponse { notice }));
        }
    };

    match state.content.submit_contact(&submission).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(ContactResponse {
                notice: Notice::message_sent(),
            }),
        ),
        Err(e) => {
            tracing::warn!("Contact submission failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ContactResponse {
                    notice: Notice::message_failed(),
                }),
            )
        }
    }
}
