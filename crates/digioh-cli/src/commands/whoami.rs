//! Whoami command - sign in and show the resulting access.

use std::sync::Arc;

use crate::ui::{self, HealthStatus};
use anyhow::Result;
use digioh_backend::BackendClient;
use digioh_core::Config;
use digioh_core::auth::{
    AccessContext, GuardState, ProfileResolver, ProfileState, Role, RouteGuard,
};
use digioh_core::navigation::admin_navigation;
use digioh_core::validation::validate_credentials;

/// Whoami command arguments.
#[derive(Debug, Clone)]
pub struct WhoamiArgs {
    /// Account e-mail.
    pub email: String,
}

/// Sign in, resolve the profile, print capabilities, then sign out.
pub async fn run_whoami(args: WhoamiArgs) -> Result<()> {
    let config = Config::load_default()?;
    let client = Arc::new(BackendClient::new(&config.backend()?)?);
    let resolver = ProfileResolver::new(client.clone());

    let password = ui::prompts::password("Password")?;
    let email = validate_credentials(&args.email, &password)?;

    let mut ctx = AccessContext::establish(client, &resolver, None).await;
    if let Err(e) = ctx.sign_in(&email, &password).await {
        ui::error(&format!("Login Failed: {e}"));
        return Ok(());
    }

    ui::header("Identity");
    if let Some(user) = ctx.snapshot().user() {
        ui::kv("User ID", &user.id.to_string());
        ui::kv("E-mail", user.email.as_deref().unwrap_or("-"));
    }

    ui::header("Profile");
    match ctx.profile() {
        ProfileState::Resolved(profile) => {
            ui::kv("Name", &profile.display_name());
            ui::kv("Role", profile.role.map_or("(unrecognized)", Role::as_str));
        }
        ProfileState::Missing => ui::warning("No profile row for this account"),
        ProfileState::Failed(e) => ui::error(&format!("Profile lookup failed: {e}")),
        ProfileState::Pending | ProfileState::Anonymous => ui::warning("Not signed in"),
    }

    ui::header("Access");
    let caps = ctx.capabilities();
    let status = |allowed: bool| {
        if allowed {
            HealthStatus::Ok
        } else {
            HealthStatus::Error
        }
    };
    ui::health_check("Admin area", status(caps.can_access_admin), None);
    ui::health_check("Users", status(caps.can_manage_users), None);

    match ctx.check(&mut RouteGuard::admin()) {
        GuardState::Allowed => {
            let names: Vec<&str> = admin_navigation(caps, "/admin")
                .iter()
                .map(|e| e.name)
                .collect();
            ui::kv("Navigation", &names.join(", "));
        }
        GuardState::Denied(reason) => {
            ui::kv("/admin", &format!("redirects to {}", reason.redirect().path()));
        }
        GuardState::Pending => ui::kv("/admin", "pending"),
    }

    if let Err(e) = ctx.sign_out().await {
        tracing::warn!("Sign-out failed: {}", e);
    }

    Ok(())
}
