//! Gateway server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use digioh_backend::BackendClient;
use digioh_core::auth::{AuthProvider, ProfileResolver, ProfileSource};
use digioh_core::config::Config;
use digioh_core::content::ContentSource;

use crate::GatewayError;
use crate::handlers::{admin, auth, public};

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Port to listen on.
    pub port: u16,
    /// Bind address.
    pub bind_address: String,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "127.0.0.1".to_string(),
            secure_cookies: false,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Config> for GatewayConfig {
    fn from(config: &Config) -> Self {
        Self {
            port: config.gateway.port,
            bind_address: config.gateway.mode.address().to_string(),
            secure_cookies: config.gateway.secure_cookies,
            timeout: Duration::from_secs(config.gateway.timeout_secs),
        }
    }
}

/// State shared across handlers.
///
/// Holds only the provider handles; every request builds its own
/// [`AccessContext`](digioh_core::AccessContext) from the token it presents.
#[derive(Clone)]
pub struct GatewayState {
    /// Auth provider.
    pub auth: Arc<dyn AuthProvider>,
    /// Profile lookup.
    pub profiles: ProfileResolver,
    /// Site content.
    pub content: Arc<dyn ContentSource>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Gateway server.
#[derive(Debug)]
pub struct Gateway {
    state: GatewayState,
}

/// Builder for constructing a Gateway with its dependencies.
#[derive(Default)]
pub struct GatewayBuilder {
    config: GatewayConfig,
    auth: Option<Arc<dyn AuthProvider>>,
    profiles: Option<Arc<dyn ProfileSource>>,
    content: Option<Arc<dyn ContentSource>>,
}

impl GatewayBuilder {
    /// Create a new builder with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set gateway configuration.
    #[must_use]
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Use one backend client for auth, profiles and content.
    #[must_use]
    pub fn with_backend(self, client: Arc<BackendClient>) -> Self {
        self.with_auth_provider(client.clone())
            .with_profile_source(client.clone())
            .with_content_source(client)
    }

    /// Set the auth provider.
    #[must_use]
    pub fn with_auth_provider(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    /// Set the profile source.
    #[must_use]
    pub fn with_profile_source(mut self, source: Arc<dyn ProfileSource>) -> Self {
        self.profiles = Some(source);
        self
    }

    /// Set the content source.
    #[must_use]
    pub fn with_content_source(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.content = Some(source);
        self
    }

    /// Build the gateway.
    ///
    /// # Errors
    ///
    /// Returns error if a provider is missing.
    pub fn build(self) -> Result<Gateway, GatewayError> {
        let auth = self
            .auth
            .ok_or_else(|| GatewayError::Config("Auth provider is required".to_string()))?;
        let profiles = self
            .profiles
            .ok_or_else(|| GatewayError::Config("Profile source is required".to_string()))?;
        let content = self
            .content
            .ok_or_else(|| GatewayError::Config("Content source is required".to_string()))?;

        Ok(Gateway {
            state: GatewayState {
                auth,
                profiles: ProfileResolver::new(profiles),
                content,
                config: self.config,
            },
        })
    }
}

impl Gateway {
    /// Shared state.
    #[must_use]
    pub const fn state(&self) -> &GatewayState {
        &self.state
    }

    /// Router with every route and layer.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Run the gateway server.
    ///
    /// # Errors
    ///
    /// Returns error if the address is invalid or the listener fails.
    pub async fn run(&self) -> Result<(), GatewayError> {
        let config = &self.state.config;
        let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
            .parse()
            .map_err(|e| GatewayError::Config(format!("Invalid address: {e}")))?;

        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Gateway listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Build the router over a state.
pub fn build_router(state: GatewayState) -> Router {
    let timeout = state.config.timeout;

    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(public::home))
        .route("/blog", get(public::blog_list))
        .route("/blog/{slug}", get(public::blog_post))
        .route("/contact", post(public::contact))
        .route("/auth", get(auth::page))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-out", post(auth::sign_out))
        .route(
            "/admin",
            get(admin::dashboard).fallback(admin::method_not_allowed),
        )
        .route(
            "/admin/{section}",
            get(admin::section).fallback(admin::method_not_allowed),
        )
        .route(
            "/admin/users/{profile_id}/role",
            put(admin::set_role).fallback(admin::method_not_allowed),
        )
        .fallback(admin::fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
