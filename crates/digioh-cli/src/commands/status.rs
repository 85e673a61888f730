//! Status command - show gateway and backend status.

use crate::ui::{self, HealthStatus};
use anyhow::Result;
use digioh_backend::BackendClient;
use digioh_core::Config;
use std::time::Duration;

/// Status command arguments.
#[derive(Debug, Clone, Default)]
pub struct StatusArgs {
    /// Show all details.
    pub all: bool,
}

/// Run the status command.
pub async fn run_status(args: StatusArgs) -> Result<()> {
    ui::header("digiOH Status");

    println!();
    ui::info("Configuration");
    let config = match Config::load_default() {
        Ok(config) => {
            ui::health_check("Config", HealthStatus::Ok, Some("loaded"));
            if args.all {
                ui::kv("  Path", &Config::default_path().display().to_string());
                ui::kv("  Gateway Port", &config.gateway.port.to_string());
                ui::kv("  Bind", config.gateway.mode.address());
            }
            config
        }
        Err(e) => {
            ui::health_check("Config", HealthStatus::Error, Some(&e.to_string()));
            return Ok(());
        }
    };

    println!();
    ui::info("Gateway");
    if probe_gateway(config.gateway.port).await {
        ui::health_check("Status", HealthStatus::Ok, Some("running"));
        ui::kv("  Port", &config.gateway.port.to_string());
    } else {
        ui::health_check("Status", HealthStatus::Warning, Some("not running"));
        ui::info("  Start with: digioh serve");
    }

    println!();
    ui::info("Backend");
    match config.backend() {
        Ok(credentials) => {
            if args.all {
                ui::kv("  URL", &credentials.url);
            }
            let client = BackendClient::new(&credentials)?;
            match client.health().await {
                Ok(()) => ui::health_check("Backend", HealthStatus::Ok, Some("reachable")),
                Err(e) => ui::health_check("Backend", HealthStatus::Error, Some(&e.to_string())),
            }
        }
        Err(e) => ui::health_check("Backend", HealthStatus::Warning, Some(&e.to_string())),
    }

    Ok(())
}

/// Whether a local gateway answers `/health`.
async fn probe_gateway(port: u16) -> bool {
    reqwest::Client::new()
        .get(format!("http://127.0.0.1:{port}/health"))
        .timeout(Duration::from_secs(2))
        .send()
        .await
        .is_ok_and(|response| response.status().is_success())
}
