//! Marketing content rows and the source they are read from.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Profile, Role};
use crate::error::FetchError;
use crate::secrets::AccessToken;

/// A service offered by the company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Row ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Body text.
    pub description: String,
    /// Icon name.
    #[serde(default)]
    pub icon: Option<String>,
    /// Gallery image URLs.
    #[serde(default)]
    pub gallery_images: Option<Vec<String>>,
    /// Highlighted on the home page.
    #[serde(default)]
    pub is_featured: bool,
    /// Ordering key.
    #[serde(default)]
    pub sort_order: i32,
    /// SEO title override.
    #[serde(default)]
    pub seo_title: Option<String>,
    /// SEO description override.
    #[serde(default)]
    pub seo_description: Option<String>,
    /// Visible on the public site.
    #[serde(default)]
    pub published: bool,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Portfolio category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioCategory {
    /// Row ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

/// Portfolio project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    /// Row ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Client name.
    #[serde(default)]
    pub client: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Category foreign key.
    #[serde(default)]
    pub category_id: Option<String>,
    /// Event date.
    #[serde(default)]
    pub project_date: Option<NaiveDate>,
    /// Image URLs.
    #[serde(default)]
    pub images: Option<Vec<String>>,
    /// Video URLs.
    #[serde(default)]
    pub videos: Option<Vec<String>>,
    /// Cover image.
    #[serde(default)]
    pub featured_image: Option<String>,
    /// Highlighted.
    #[serde(default)]
    pub is_featured: bool,
    /// Ordering key.
    #[serde(default)]
    pub sort_order: i32,
    /// SEO title override.
    #[serde(default)]
    pub seo_title: Option<String>,
    /// SEO description override.
    #[serde(default)]
    pub seo_description: Option<String>,
    /// Visible on the public site.
    #[serde(default)]
    pub published: bool,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Embedded category.
    #[serde(default)]
    pub portfolio_categories: Option<PortfolioCategory>,
}

/// Team member card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Row ID.
    pub id: String,
    /// Name.
    pub name: String,
    /// Job title (not an access role).
    pub role: String,
    /// Photo URL.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Short bio.
    #[serde(default)]
    pub bio: Option<String>,
    /// `LinkedIn` URL.
    #[serde(default)]
    pub linkedin_url: Option<String>,
    /// Twitter URL.
    #[serde(default)]
    pub twitter_url: Option<String>,
    /// Instagram URL.
    #[serde(default)]
    pub instagram_url: Option<String>,
    /// Ordering key.
    #[serde(default)]
    pub sort_order: i32,
    /// Shown on the site.
    #[serde(default)]
    pub is_active: bool,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Client logo strip entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLogo {
    /// Row ID.
    pub id: String,
    /// Client name.
    pub name: String,
    /// Logo URL.
    pub logo_url: String,
    /// Client website.
    #[serde(default)]
    pub website_url: Option<String>,
    /// Ordering key.
    #[serde(default)]
    pub sort_order: i32,
    /// Shown on the site.
    #[serde(default)]
    pub is_active: bool,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Author fields embedded in a blog post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogAuthor {
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Publication status of a blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Not public.
    Draft,
    /// Public once `published_at` has passed.
    Published,
    /// Withdrawn.
    Archived,
    /// Anything else the backend stores.
    #[serde(other)]
    Unknown,
}

/// Blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Row ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Body (rich text, rendered by the client).
    pub content: String,
    /// Teaser.
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Cover image.
    #[serde(default)]
    pub featured_image: Option<String>,
    /// Author identity.
    pub author_id: String,
    /// Status.
    pub status: PostStatus,
    /// Publication time.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// SEO title override.
    #[serde(default)]
    pub seo_title: Option<String>,
    /// SEO description override.
    #[serde(default)]
    pub seo_description: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Embedded author profile.
    #[serde(default)]
    pub profiles: Option<BlogAuthor>,
}

impl BlogPost {
    /// Whether the post is visible to the public at `now`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Published && self.published_at.is_some_and(|t| t <= now)
    }
}

/// Workflow status of a contact submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    /// Unread.
    New,
    /// Seen.
    Read,
    /// Answered.
    Replied,
}

/// Stored contact form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    /// Row ID.
    pub id: String,
    /// Sender name.
    pub name: String,
    /// Sender e-mail.
    pub email: String,
    /// Sender company.
    #[serde(default)]
    pub company: Option<String>,
    /// Message body.
    pub message: String,
    /// Workflow status.
    pub status: ContactStatus,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

/// Contact form payload, after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContactSubmission {
    /// Sender name.
    pub name: String,
    /// Sender e-mail.
    pub email: String,
    /// Sender company.
    pub company: Option<String>,
    /// Message body.
    pub message: String,
}

/// Tables shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// `services`
    Services,
    /// `portfolio`
    Portfolio,
    /// `team_members`
    TeamMembers,
    /// `client_logos`
    ClientLogos,
    /// `blog_posts`
    BlogPosts,
    /// `contact_submissions`
    ContactSubmissions,
    /// `profiles`
    Profiles,
}

impl Table {
    /// Tables counted on the dashboard, in card order.
    pub const DASHBOARD: [Self; 6] = [
        Self::Services,
        Self::Portfolio,
        Self::TeamMembers,
        Self::ClientLogos,
        Self::BlogPosts,
        Self::ContactSubmissions,
    ];

    /// Backend table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Portfolio => "portfolio",
            Self::TeamMembers => "team_members",
            Self::ClientLogos => "client_logos",
            Self::BlogPosts => "blog_posts",
            Self::ContactSubmissions => "contact_submissions",
            Self::Profiles => "profiles",
        }
    }
}

/// Dashboard counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Services.
    pub services: u64,
    /// Portfolio items.
    pub portfolio: u64,
    /// Team members.
    pub team: u64,
    /// Client logos.
    pub clients: u64,
    /// Blog posts.
    pub blog: u64,
    /// Contact submissions.
    pub contact: u64,
}

impl DashboardStats {
    /// Record a count for a table. Tables not on the dashboard are ignored.
    pub const fn set(&mut self, table: Table, count: u64) {
        match table {
            Table::Services => self.services = count,
            Table::Portfolio => self.portfolio = count,
            Table::TeamMembers => self.team = count,
            Table::ClientLogos => self.clients = count,
            Table::BlogPosts => self.blog = count,
            Table::ContactSubmissions => self.contact = count,
            Table::Profiles => {}
        }
    }
}

/// Who a read is made for.
///
/// `Public` reads use only the project key and see published/active rows.
/// `Admin` reads carry the user's token, see every row, and are filtered by
/// the backend's row-level security.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Anonymous site visitor.
    Public,
    /// Signed-in admin-area user.
    Admin(&'a AccessToken),
}

impl Scope<'_> {
    /// Token to send, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&AccessToken> {
        match self {
            Self::Public => None,
            Self::Admin(token) => Some(token),
        }
    }

    /// Whether only published/active rows should be returned.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Source of site content.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Services, `sort_order` ascending.
    async fn services(&self, scope: Scope<'_>) -> Result<Vec<Service>, FetchError>;

    /// Portfolio items, optionally limited to one category slug.
    async fn portfolio(
        &self,
        scope: Scope<'_>,
        category: Option<&str>,
    ) -> Result<Vec<PortfolioItem>, FetchError>;

    /// Portfolio categories by name.
    async fn portfolio_categories(&self) -> Result<Vec<PortfolioCategory>, FetchError>;

    /// Team members, `sort_order` ascending.
    async fn team(&self, scope: Scope<'_>) -> Result<Vec<TeamMember>, FetchError>;

    /// Client logos, `sort_order` ascending.
    async fn client_logos(&self, scope: Scope<'_>) -> Result<Vec<ClientLogo>, FetchError>;

    /// Blog posts. Public scope returns live posts, newest first.
    async fn blog_posts(
        &self,
        scope: Scope<'_>,
        now: DateTime<Utc>,
    ) -> Result<Vec<BlogPost>, FetchError>;

    /// A single live post by slug.
    async fn blog_post(&self, slug: &str, now: DateTime<Utc>)
    -> Result<Option<BlogPost>, FetchError>;

    /// Store a contact form submission.
    async fn submit_contact(&self, submission: &NewContactSubmission) -> Result<(), FetchError>;

    /// Contact submissions, newest first.
    async fn contact_submissions(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<ContactSubmission>, FetchError>;

    /// All profiles, newest first.
    async fn profiles(&self, token: &AccessToken) -> Result<Vec<Profile>, FetchError>;

    /// Change the role on a profile row and return the updated row.
    async fn set_role(
        &self,
        token: &AccessToken,
        profile_id: &str,
        role: Role,
    ) -> Result<Option<Profile>, FetchError>;

    /// Exact row count of a table.
    async fn count(&self, token: &AccessToken, table: Table) -> Result<u64, FetchError>;
}
