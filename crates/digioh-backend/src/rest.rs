//! PostgREST-compatible table API.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use digioh_core::auth::{Profile, ProfileSource, Role, UserId};
use digioh_core::content::{
    BlogPost, ClientLogo, ContactSubmission, ContentSource, NewContactSubmission, PortfolioCategory,
    PortfolioItem, Scope, Service, Table, TeamMember,
};
use digioh_core::error::FetchError;
use digioh_core::secrets::{AccessToken, PROVIDER_SECRET_PATTERNS, scrub_secrets};

use crate::client::{BackendClient, scrub};

const CATEGORY_COLUMNS: &str = "id,name,slug,created_at";
const AUTHOR_EMBED: &str = "*,profiles(first_name,last_name,avatar_url)";

/// A read against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    select: String,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<usize>,
}

impl Query {
    /// `select=*` on a table.
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Columns and embeds to return.
    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = columns.into();
        self
    }

    /// `column = value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// `column <= value`.
    #[must_use]
    pub fn lte(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filters.push((column.to_string(), format!("lte.{value}")));
        self
    }

    /// Sort by a column.
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order = Some(format!("{column}.{direction}"));
        self
    }

    /// Cap the number of rows.
    #[must_use]
    pub const fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Request path.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/rest/v1/{}", self.table)
    }

    /// Query string parameters, in a stable order.
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select.clone())];
        params.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Total from a `Content-Range` header (`0-24/3573`, `*/0`).
#[must_use]
pub fn parse_content_range(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse().ok()
}

#[derive(Debug, Default, Deserialize)]
struct RestErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn network(err: &reqwest::Error) -> FetchError {
    FetchError::Network(scrub(err))
}

async fn check(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let parsed: RestErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = match (parsed.message, parsed.hint) {
        (Some(message), Some(hint)) => format!("{message} ({hint})"),
        (Some(message), None) => message,
        _ => body.trim().to_string(),
    };
    Err(FetchError::Status {
        status: status.as_u16(),
        message: scrub_secrets(&message, PROVIDER_SECRET_PATTERNS),
    })
}

impl BackendClient {
    fn table_request(
        &self,
        method: Method,
        query: &Query,
        token: Option<&AccessToken>,
    ) -> RequestBuilder {
        self.request(method, &query.path(), token)
            .query(&query.params())
    }

    /// Run a read and decode the rows.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        query: &Query,
        token: Option<&AccessToken>,
    ) -> Result<Vec<T>, FetchError> {
        let response = self
            .table_request(Method::GET, query, token)
            .send()
            .await
            .map_err(|e| network(&e))?;
        let bytes = check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| network(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(table = %query.table, "Row decode failed: {}", e);
            FetchError::Decode(e.to_string())
        })
    }

    /// Run a read limited to one row.
    pub(crate) async fn fetch_one<T: DeserializeOwned>(
        &self,
        query: Query,
        token: Option<&AccessToken>,
    ) -> Result<Option<T>, FetchError> {
        let rows = self.fetch(&query.limit(1), token).await?;
        Ok(rows.into_iter().next())
    }

    async fn count_rows(&self, table: Table, token: &AccessToken) -> Result<u64, FetchError> {
        let query = Query::table(table.name()).select("id");
        let response = self
            .table_request(Method::HEAD, &query, Some(token))
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|e| network(&e))?;
        let response = check(response).await?;
        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| FetchError::Decode(format!("No row count for {}", table.name())))
    }

    fn listing(table: Table, scope: Scope<'_>, flag: &str) -> Query {
        let query = Query::table(table.name()).order("sort_order", true);
        if scope.is_public() {
            query.eq(flag, true)
        } else {
            query
        }
    }
}

#[async_trait]
impl ProfileSource for BackendClient {
    async fn profile_for(
        &self,
        user_id: &UserId,
        token: &AccessToken,
    ) -> Result<Option<Profile>, FetchError> {
        self.fetch_one(Query::table("profiles").eq("user_id", user_id), Some(token))
            .await
    }
}

#[async_trait]
impl ContentSource for BackendClient {
    async fn services(&self, scope: Scope<'_>) -> Result<Vec<Service>, FetchError> {
        let query = Self::listing(Table::Services, scope, "published");
        self.fetch(&query, scope.token()).await
    }

    async fn portfolio(
        &self,
        scope: Scope<'_>,
        category: Option<&str>,
    ) -> Result<Vec<PortfolioItem>, FetchError> {
        let mut query = Self::listing(Table::Portfolio, scope, "published");
        query = match category {
            // Inner join so rows outside the category are dropped, not just their embed.
            Some(slug) => query
                .select(format!("*,portfolio_categories!inner({CATEGORY_COLUMNS})"))
                .eq("portfolio_categories.slug", slug),
            None => query.select(format!("*,portfolio_categories({CATEGORY_COLUMNS})")),
        };
        self.fetch(&query, scope.token()).await
    }

    async fn portfolio_categories(&self) -> Result<Vec<PortfolioCategory>, FetchError> {
        let query = Query::table("portfolio_categories").order("name", true);
        self.fetch(&query, None).await
    }

    async fn team(&self, scope: Scope<'_>) -> Result<Vec<TeamMember>, FetchError> {
        let query = Self::listing(Table::TeamMembers, scope, "is_active");
        self.fetch(&query, scope.token()).await
    }

    async fn client_logos(&self, scope: Scope<'_>) -> Result<Vec<ClientLogo>, FetchError> {
        let query = Self::listing(Table::ClientLogos, scope, "is_active");
        self.fetch(&query, scope.token()).await
    }

    async fn blog_posts(
        &self,
        scope: Scope<'_>,
        now: DateTime<Utc>,
    ) -> Result<Vec<BlogPost>, FetchError> {
        let query = Query::table(Table::BlogPosts.name()).select(AUTHOR_EMBED);
        let query = if scope.is_public() {
            query
                .eq("status", "published")
                .lte("published_at", timestamp(now))
                .order("published_at", false)
        } else {
            query.order("created_at", false)
        };
        self.fetch(&query, scope.token()).await
    }

    async fn blog_post(
        &self,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<BlogPost>, FetchError> {
        let query = Query::table(Table::BlogPosts.name())
            .select(AUTHOR_EMBED)
            .eq("slug", slug)
            .eq("status", "published")
            .lte("published_at", timestamp(now));
        self.fetch_one(query, None).await
    }

    async fn submit_contact(&self, submission: &NewContactSubmission) -> Result<(), FetchError> {
        let query = Query::table(Table::ContactSubmissions.name());
        let response = self
            .request(Method::POST, &query.path(), None)
            .header("Prefer", "return=minimal")
            .json(submission)
            .send()
            .await
            .map_err(|e| network(&e))?;
        check(response).await?;
        tracing::info!("Contact submission stored");
        Ok(())
    }

    async fn contact_submissions(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<ContactSubmission>, FetchError> {
        let query = Query::table(Table::ContactSubmissions.name()).order("created_at", false);
        self.fetch(&query, Some(token)).await
    }

    async fn profiles(&self, token: &AccessToken) -> Result<Vec<Profile>, FetchError> {
        let query = Query::table(Table::Profiles.name()).order("created_at", false);
        self.fetch(&query, Some(token)).await
    }

    async fn set_role(
        &self,
        token: &AccessToken,
        profile_id: &str,
        role: Role,
    ) -> Result<Option<Profile>, FetchError> {
        let query = Query::table(Table::Profiles.name()).eq("id", profile_id);
        let response = self
            .request(Method::PATCH, &query.path(), Some(token))
            .query(&query.params())
            .header("Prefer", "return=representation")
            .json(&json!({ "role": role }))
            .send()
            .await
            .map_err(|e| network(&e))?;
        let rows: Vec<Profile> = check(response)
            .await?
            .json()
            .await
            .map_err(|e| FetchError::Decode(scrub(&e)))?;
        Ok(rows.into_iter().next())
    }

    async fn count(&self, token: &AccessToken, table: Table) -> Result<u64, FetchError> {
        self.count_rows(table, token).await
    }
}
