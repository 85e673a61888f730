//! Doctor command - configuration and backend checks.

use crate::ui::{self, HealthStatus};
use anyhow::Result;
use digioh_backend::BackendClient;
use digioh_core::Config;

/// Doctor command arguments.
#[derive(Debug, Clone, Default)]
pub struct DoctorArgs {
    /// Write a config template when none exists.
    pub repair: bool,
}

/// Check result.
enum CheckResult {
    Ok(Option<String>),
    Warning(String),
    Error(String),
}

impl CheckResult {
    fn report(&self, name: &str) -> bool {
        match self {
            Self::Ok(detail) => {
                ui::health_check(name, HealthStatus::Ok, detail.as_deref());
                false
            }
            Self::Warning(msg) => {
                ui::health_check(name, HealthStatus::Warning, Some(msg));
                true
            }
            Self::Error(msg) => {
                ui::health_check(name, HealthStatus::Error, Some(msg));
                true
            }
        }
    }
}

/// Run health checks and optionally write a config template.
pub async fn run_doctor(args: DoctorArgs) -> Result<()> {
    ui::header("digiOH Doctor");
    println!();

    let mut issues_found = 0;
    let mut repairs_made = 0;

    ui::info("Checking configuration file...");
    let file = check_config_file();
    if file.report("Config file") {
        issues_found += 1;
        if args.repair && !Config::default_path().exists() {
            ui::info("  → Writing config template...");
            match write_template() {
                Ok(()) => {
                    ui::success(&format!(
                        "  → Template written to {}",
                        Config::default_path().display()
                    ));
                    repairs_made += 1;
                }
                Err(e) => ui::error(&format!("  → Could not write template: {e}")),
            }
        }
    }

    ui::info("Checking settings...");
    let config = match Config::load_default() {
        Ok(config) => {
            CheckResult::Ok(None).report("Settings");
            config
        }
        Err(e) => {
            CheckResult::Error(e.to_string()).report("Settings");
            summary(issues_found + 1, repairs_made, args.repair);
            return Ok(());
        }
    };

    ui::info("Checking backend credentials...");
    let credentials = match config.backend() {
        Ok(credentials) => {
            CheckResult::Ok(Some(credentials.url.clone())).report("Credentials");
            Some(credentials)
        }
        Err(e) => {
            CheckResult::Error(e.to_string()).report("Credentials");
            issues_found += 1;
            None
        }
    };

    if let Some(credentials) = credentials {
        ui::info("Checking backend reachability...");
        let check = match BackendClient::new(&credentials) {
            Ok(client) => match client.health().await {
                Ok(()) => CheckResult::Ok(Some("auth and rest reachable".to_string())),
                Err(e) => CheckResult::Error(e.to_string()),
            },
            Err(e) => CheckResult::Error(e.to_string()),
        };
        if check.report("Backend") {
            issues_found += 1;
        }
    }

    ui::info("Checking cookie settings...");
    let cookies = if config.gateway.secure_cookies || config.gateway.mode.address() == "127.0.0.1"
    {
        CheckResult::Ok(None)
    } else {
        CheckResult::Warning(
            "Gateway binds beyond localhost without secureCookies".to_string(),
        )
    };
    if cookies.report("Cookies") {
        issues_found += 1;
    }

    summary(issues_found, repairs_made, args.repair);
    Ok(())
}

fn summary(issues_found: usize, repairs_made: usize, repair: bool) {
    println!();
    ui::header("Summary");

    if issues_found == 0 {
        ui::success("All checks passed!");
    } else {
        ui::warning(&format!("{issues_found} issue(s) found"));
        if repair {
            ui::info(&format!("{repairs_made} repair(s) made"));
        } else {
            ui::info("Run with --repair to write a config template");
        }
    }
}

fn check_config_file() -> CheckResult {
    let path = Config::default_path();
    if !path.exists() {
        return CheckResult::Warning(format!(
            "{} not found, using defaults and environment",
            path.display()
        ));
    }
    match Config::load(&path) {
        Ok(_) => CheckResult::Ok(Some(path.display().to_string())),
        Err(e) => CheckResult::Error(format!("Invalid config: {e}")),
    }
}

fn write_template() -> Result<()> {
    let path = Config::default_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let template = serde_json::json!({
        "backend": {
            "url": "https://your-project.supabase.co",
            "anonKey": ""
        },
        "gateway": {
            "port": 8080,
            "mode": "local",
            "secureCookies": false
        }
    });

    std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;
    Ok(())
}
