//! Router tests against in-memory auth, profile and content sources.
//!
//! These drive the full axum router, extractors and layers included.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use digioh_core::auth::{
    AuthProvider, AuthSession, Identity, Profile, ProfileSource, Role, SignUpAttributes,
    SignUpOutcome, UserId,
};
use digioh_core::content::{
    BlogPost, ClientLogo, ContactSubmission, ContentSource, NewContactSubmission,
    PortfolioCategory, PortfolioItem, Scope, Service, Table, TeamMember,
};
use digioh_core::error::{AuthError, FetchError};
use digioh_core::secrets::AccessToken;
use digioh_gateway::{GatewayBuilder, GatewayConfig};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeAuth {
    /// email -> (password, user id)
    accounts: Mutex<HashMap<String, (String, String)>>,
    fail_sign_out: bool,
    sign_outs: Mutex<usize>,
}

impl FakeAuth {
    fn account(self, email: &str, password: &str, id: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), id.to_string()));
        self
    }

    fn session(email: &str, id: &str) -> AuthSession {
        AuthSession {
            identity: Identity {
                id: UserId::new(id),
                email: Some(email.to_string()),
            },
            access_token: AccessToken::new(format!("token-{id}")),
            expires_at: None,
        }
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn restore(&self, token: &AccessToken) -> Result<Option<AuthSession>, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .find(|(_, (_, id))| token.expose() == format!("token-{id}"))
            .map(|(email, (_, id))| Self::session(email, id)))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((pw, id)) if pw == password => Ok(Self::session(email, id)),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _attrs: &SignUpAttributes,
    ) -> Result<SignUpOutcome, AuthError> {
        if self.accounts.lock().unwrap().contains_key(email) {
            return Err(AuthError::AccountExists(email.to_string()));
        }
        Ok(SignUpOutcome::ConfirmationRequired)
    }

    async fn sign_out(&self, _token: &AccessToken) -> Result<(), AuthError> {
        *self.sign_outs.lock().unwrap() += 1;
        if self.fail_sign_out {
            Err(AuthError::Network("timeout".to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct FakeProfiles {
    rows: Mutex<HashMap<String, Profile>>,
    failing: bool,
}

impl FakeProfiles {
    fn with(self, user_id: &str, role: &str) -> Self {
        self.rows
            .lock()
            .unwrap()
            .insert(user_id.to_string(), profile(user_id, role));
        self
    }
}

#[async_trait]
impl ProfileSource for FakeProfiles {
    async fn profile_for(
        &self,
        user_id: &UserId,
        _token: &AccessToken,
    ) -> Result<Option<Profile>, FetchError> {
        if self.failing {
            return Err(FetchError::Network("connection refused".to_string()));
        }
        Ok(self.rows.lock().unwrap().get(&user_id.0).cloned())
    }
}

#[derive(Default)]
struct FakeContent {
    failing_team: bool,
    failing_submit: bool,
    submissions: Mutex<Vec<NewContactSubmission>>,
    role_changes: Mutex<Vec<(String, Role)>>,
    profiles: Vec<Profile>,
}

#[async_trait]
impl ContentSource for FakeContent {
    async fn services(&self, scope: Scope<'_>) -> Result<Vec<Service>, FetchError> {
        let published = scope.is_public();
        Ok(vec![
            serde_json::from_value(json!({
                "id": "s1", "title": "Virtual Events", "slug": "virtual-events",
                "description": "Streaming and production", "sort_order": 1,
                "published": published,
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
            }))
            .unwrap(),
        ])
    }

    async fn portfolio(
        &self,
        _scope: Scope<'_>,
        _category: Option<&str>,
    ) -> Result<Vec<PortfolioItem>, FetchError> {
        Ok(Vec::new())
    }

    async fn portfolio_categories(&self) -> Result<Vec<PortfolioCategory>, FetchError> {
        Ok(Vec::new())
    }

    async fn team(&self, _scope: Scope<'_>) -> Result<Vec<TeamMember>, FetchError> {
        if self.failing_team {
            return Err(FetchError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(Vec::new())
    }

    async fn client_logos(&self, _scope: Scope<'_>) -> Result<Vec<ClientLogo>, FetchError> {
        Ok(Vec::new())
    }

    async fn blog_posts(
        &self,
        _scope: Scope<'_>,
        _now: DateTime<Utc>,
    ) -> Result<Vec<BlogPost>, FetchError> {
        Ok(Vec::new())
    }

    async fn blog_post(
        &self,
        _slug: &str,
        _now: DateTime<Utc>,
    ) -> Result<Option<BlogPost>, FetchError> {
        Ok(None)
    }

    async fn submit_contact(&self, submission: &NewContactSubmission) -> Result<(), FetchError> {
        if self.failing_submit {
            return Err(FetchError::Network("reset".to_string()));
        }
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn contact_submissions(
        &self,
        _token: &AccessToken,
    ) -> Result<Vec<ContactSubmission>, FetchError> {
        Ok(Vec::new())
    }

    async fn profiles(&self, _token: &AccessToken) -> Result<Vec<Profile>, FetchError> {
        Ok(self.profiles.clone())
    }

    async fn set_role(
        &self,
        _token: &AccessToken,
        profile_id: &str,
        role: Role,
    ) -> Result<Option<Profile>, FetchError> {
        self.role_changes
            .lock()
            .unwrap()
            .push((profile_id.to_string(), role));
        Ok(self.profiles.iter().find(|p| p.id == profile_id).cloned().map(|mut p| {
            p.role = Some(role);
            p
        }))
    }

    async fn count(&self, _token: &AccessToken, table: Table) -> Result<u64, FetchError> {
        match table {
            Table::ContactSubmissions => Err(FetchError::Status {
                status: 403,
                message: "permission denied".to_string(),
            }),
            Table::Services => Ok(6),
            _ => Ok(2),
        }
    }
}

fn profile(user_id: &str, role: &str) -> Profile {
    serde_json::from_value(json!({
        "id": format!("profile-{user_id}"),
        "user_id": user_id,
        "email": format!("{user_id}@digioh.com"),
        "first_name": "Sam",
        "last_name": null,
        "role": role,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap()
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    auth: Arc<FakeAuth>,
    profiles: Arc<FakeProfiles>,
    content: Arc<FakeContent>,
}

impl Harness {
    fn new() -> Self {
        let auth = FakeAuth::default()
            .account("super@digioh.com", "pw", "super")
            .account("admin@digioh.com", "pw", "admin")
            .account("editor@digioh.com", "pw", "editor")
            .account("author@digioh.com", "pw", "author")
            .account("odd@digioh.com", "pw", "odd")
            .account("ghost@digioh.com", "pw", "ghost");
        let profiles = FakeProfiles::default()
            .with("super", "superadmin")
            .with("admin", "admin")
            .with("editor", "editor")
            .with("author", "author")
            .with("odd", "owner");
        let content = FakeContent {
            profiles: vec![profile("editor", "editor"), profile("author", "author")],
            ..FakeContent::default()
        };
        Self {
            auth: Arc::new(auth),
            profiles: Arc::new(profiles),
            content: Arc::new(content),
        }
    }

    fn app(&self) -> Router {
        GatewayBuilder::new()
            .with_config(GatewayConfig::default())
            .with_auth_provider(self.auth.clone())
            .with_profile_source(self.profiles.clone())
            .with_content_source(self.content.clone())
            .build()
            .unwrap()
            .router()
    }
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("digioh_session={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn nav_names(page: &Value) -> Vec<String> {
    page["layout"]["navigation"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let app = Harness::new().app();
    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_admin_redirects_to_sign_in() {
    let app = Harness::new().app();
    for path in ["/admin", "/admin/services", "/admin/users"] {
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/auth");
    }
}

#[tokio::test]
async fn test_stale_token_is_anonymous() {
    let app = Harness::new().app();
    let response = app.oneshot(get("/admin", Some("token-nobody"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth");
}

#[tokio::test]
async fn test_author_redirects_to_root() {
    let app = Harness::new().app();
    let response = app.oneshot(get("/admin", Some("token-author"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_unknown_role_redirects_to_root() {
    let app = Harness::new().app();
    let response = app.oneshot(get("/admin", Some("token-odd"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_missing_profile_redirects_to_root() {
    let app = Harness::new().app();
    let response = app.oneshot(get("/admin", Some("token-ghost"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_profile_failure_redirects_to_root() {
    let mut harness = Harness::new();
    harness.profiles = Arc::new(FakeProfiles {
        failing: true,
        ..FakeProfiles::default().with("admin", "admin")
    });
    let response = harness
        .app()
        .oneshot(get("/admin", Some("token-admin")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_editor_dashboard() {
    let app = Harness::new().app();
    let response = app.oneshot(get("/admin", Some("token-editor"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_json(response).await;
    assert_eq!(
        nav_names(&page),
        vec!["Dashboard", "Services", "Portfolio", "Team", "Clients", "Blog", "Contact"]
    );
    assert_eq!(page["layout"]["title"], "Dashboard");
    assert_eq!(page["layout"]["profile"]["role"], "editor");
    assert_eq!(page["section"], "dashboard");
    assert_eq!(page["data"]["services"], 6);
    // Denied count shows as zero with a notice.
    assert_eq!(page["data"]["contact"], 0);
    assert_eq!(page["notices"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_editor_cannot_open_users() {
    let app = Harness::new().app();
    let response = app
        .oneshot(get("/admin/users", Some("token-editor")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_section_is_not_found() {
    let app = Harness::new().app();
    let response = app
        .oneshot(get("/admin/settings", Some("token-admin")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unmatched_admin_paths_are_guarded() {
    let app = Harness::new().app();
    for path in [
        "/admin/users/p1",
        "/admin/services/new",
        "/admin/users/p1/role",
    ] {
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/auth");

        let response = app
            .clone()
            .oneshot(get(path, Some("token-author")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/");
    }

    let response = app
        .oneshot(json_request(Method::POST, "/admin", None, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth");
}

#[tokio::test]
async fn test_unmatched_admin_paths_once_allowed() {
    let app = Harness::new().app();
    let response = app
        .clone()
        .oneshot(get("/admin/services/new", Some("token-editor")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "not_found");

    let response = app
        .clone()
        .oneshot(get("/admin/users/profile-author/role", Some("token-admin")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = app
        .oneshot(json_request(
            Method::DELETE,
            "/admin/services",
            Some("token-admin"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unmatched_public_path_is_not_found() {
    let app = Harness::new().app();
    let response = app.oneshot(get("/nope", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(location(&response).is_empty());
}

#[tokio::test]
async fn test_admin_users_section() {
    let app = Harness::new().app();
    for token in ["token-admin", "token-super"] {
        let response = app
            .clone()
            .oneshot(get("/admin/users", Some(token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let page = body_json(response).await;
        let names = nav_names(&page);
        assert_eq!(names.last().map(String::as_str), Some("Users"));
        assert_eq!(page["layout"]["title"], "Users");
        assert_eq!(page["section"], "users");
        assert_eq!(page["data"].as_array().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_admin_section_lists_unpublished() {
    let app = Harness::new().app();
    let response = app
        .oneshot(get("/admin/services", Some("token-editor")))
        .await
        .unwrap();
    let page = body_json(response).await;
    assert_eq!(page["layout"]["title"], "Services");
    assert_eq!(page["data"][0]["published"], false);
}

#[tokio::test]
async fn test_role_downgrade_takes_effect_next_request() {
    let harness = Harness::new();
    let app = harness.app();

    let response = app
        .clone()
        .oneshot(get("/admin", Some("token-admin")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    harness
        .profiles
        .rows
        .lock()
        .unwrap()
        .insert("admin".to_string(), profile("admin", "author"));

    let response = app.oneshot(get("/admin", Some("token-admin"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_bearer_header_accepted() {
    let app = Harness::new().app();
    let request = Request::builder()
        .uri("/admin")
        .header(header::AUTHORIZATION, "Bearer token-editor")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Role changes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_set_role_requires_manage_users() {
    let harness = Harness::new();
    let response = harness
        .app()
        .oneshot(json_request(
            Method::PUT,
            "/admin/users/profile-author/role",
            Some("token-editor"),
            json!({ "role": "editor" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(harness.content.role_changes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_set_role() {
    let harness = Harness::new();
    let response = harness
        .app()
        .oneshot(json_request(
            Method::PUT,
            "/admin/users/profile-author/role",
            Some("token-admin"),
            json!({ "role": "Editor" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "editor");
    assert_eq!(
        harness.content.role_changes.lock().unwrap().as_slice(),
        &[("profile-author".to_string(), Role::Editor)]
    );
}

#[tokio::test]
async fn test_set_unknown_role() {
    let app = Harness::new().app();
    let response = app
        .oneshot(json_request(
            Method::PUT,
            "/admin/users/profile-author/role",
            Some("token-admin"),
            json!({ "role": "owner" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "unknown_role");
}

#[tokio::test]
async fn test_set_role_missing_profile() {
    let app = Harness::new().app();
    let response = app
        .oneshot(json_request(
            Method::PUT,
            "/admin/users/profile-nobody/role",
            Some("token-super"),
            json!({ "role": "author" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Auth pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_sign_in_sets_cookie() {
    let app = Harness::new().app();
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/auth/sign-in",
            None,
            json!({ "email": "editor@digioh.com", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("digioh_session=token-editor;"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let body = body_json(response).await;
    assert_eq!(body["notice"]["title"], "Welcome back!");
    assert_eq!(body["user"]["id"], "editor");
}

#[tokio::test]
async fn test_sign_in_failure() {
    let app = Harness::new().app();
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/auth/sign-in",
            None,
            json!({ "email": "editor@digioh.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_empty());

    let body = body_json(response).await;
    assert_eq!(body["notice"]["title"], "Login Failed");
    assert_eq!(body["notice"]["description"], "Invalid login credentials");
    assert_eq!(body["notice"]["variant"], "destructive");
}

#[tokio::test]
async fn test_sign_up_needs_confirmation() {
    let app = Harness::new().app();
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/sign-up",
            None,
            json!({ "email": "new@digioh.com", "password": "pw", "first_name": "New" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(set_cookie(&response).is_empty());
    let body = body_json(response).await;
    assert_eq!(body["notice"]["title"], "Account Created!");
    assert_eq!(
        body["notice"]["description"],
        "Please check your email to confirm your account."
    );

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/auth/sign-up",
            None,
            json!({ "email": "editor@digioh.com", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["notice"]["title"], "Signup Failed");
}

#[tokio::test]
async fn test_sign_up_rejects_overlong_name() {
    let app = Harness::new().app();
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/auth/sign-up",
            None,
            json!({
                "email": "new@digioh.com",
                "password": "pw",
                "first_name": "a".repeat(201),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["notice"]["title"], "Signup Failed");
    assert!(
        body["notice"]["description"]
            .as_str()
            .unwrap()
            .contains("first_name")
    );
}

#[tokio::test]
async fn test_auth_page_redirects_when_signed_in() {
    let app = Harness::new().app();
    let response = app
        .clone()
        .oneshot(get("/auth", Some("token-author")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = app.oneshot(get("/auth", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sign_out_clears_cookie_when_provider_fails() {
    let mut harness = Harness::new();
    harness.auth = Arc::new(FakeAuth {
        fail_sign_out: true,
        ..FakeAuth::default().account("admin@digioh.com", "pw", "admin")
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/sign-out")
        .header(header::COOKIE, "digioh_session=token-admin")
        .body(Body::empty())
        .unwrap();
    let response = harness.app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).starts_with("digioh_session=; Max-Age=0"));
    assert_eq!(*harness.auth.sign_outs.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_sign_out_without_session() {
    let harness = Harness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/sign-out")
        .body(Body::empty())
        .unwrap();
    let response = harness.app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).starts_with("digioh_session=;"));
    assert_eq!(*harness.auth.sign_outs.lock().unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Public site
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_home_survives_failed_section() {
    let mut harness = Harness::new();
    harness.content = Arc::new(FakeContent {
        failing_team: true,
        ..FakeContent::default()
    });
    let response = harness.app().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_json(response).await;
    assert_eq!(page["services"][0]["slug"], "virtual-events");
    assert_eq!(page["services"][0]["published"], true);
    assert_eq!(page["team"], json!([]));
    assert_eq!(page["notices"][0]["title"], "Failed to load team");
    assert_eq!(page["anchors"][0]["href"], "#home");
}

#[tokio::test]
async fn test_missing_blog_post() {
    let app = Harness::new().app();
    let response = app.oneshot(get("/blog/nope", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_success() {
    let harness = Harness::new();
    let response = harness
        .app()
        .oneshot(json_request(
            Method::POST,
            "/contact",
            None,
            json!({
                "name": "Ada",
                "email": "ada@example.com",
                "company": "Acme",
                "message": "We need a stage for 300 people."
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["notice"]["title"], "Message Sent!");
    assert_eq!(
        body["notice"]["description"],
        "We'll get back to you within 24 hours."
    );
    assert_eq!(harness.content.submissions.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_contact_invalid() {
    let harness = Harness::new();
    let response = harness
        .app()
        .oneshot(json_request(
            Method::POST,
            "/contact",
            None,
            json!({ "name": "Ada", "email": "not-an-email", "message": "hi" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(harness.content.submissions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_contact_backend_failure() {
    let mut harness = Harness::new();
    harness.content = Arc::new(FakeContent {
        failing_submit: true,
        ..FakeContent::default()
    });
    let response = harness
        .app()
        .oneshot(json_request(
            Method::POST,
            "/contact",
            None,
            json!({ "name": "Ada", "email": "ada@example.com", "message": "hi" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["notice"]["title"], "Error");
    assert_eq!(
        body["notice"]["description"],
        "Failed to send message. Please try again."
    );
}
