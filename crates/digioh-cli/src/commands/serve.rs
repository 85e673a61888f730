//! Serve command - run the gateway server.

use crate::ui;
use anyhow::Result;
use digioh_core::Config;
use digioh_core::config::BindMode;

/// Serve command arguments.
#[derive(Debug, Clone, Default)]
pub struct ServeArgs {
    /// Port to listen on.
    pub port: Option<u16>,
    /// Bind address.
    pub bind: Option<String>,
    /// Start even if the port looks busy.
    pub force: bool,
}

/// Start the gateway server.
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = Config::load_default()?;
    if let Some(port) = args.port {
        config.gateway.port = port;
    }
    if let Some(bind) = args.bind.as_deref() {
        config.gateway.mode = BindMode::parse(bind);
    }

    if let Err(e) = config.backend() {
        ui::error(&e.to_string());
        ui::info("Set DIGIOH_BACKEND_URL and DIGIOH_BACKEND_KEY, or run 'digioh doctor --repair'");
        return Ok(());
    }

    let address = format!("{}:{}", config.gateway.mode.address(), config.gateway.port);
    if !args.force && std::net::TcpListener::bind(&address).is_err() {
        ui::error(&format!(
            "{address} is already in use. Use --force to override."
        ));
        return Ok(());
    }

    ui::header("Starting digiOH Gateway");
    ui::kv("Address", &address);
    ui::kv(
        "Mode",
        match &config.gateway.mode {
            BindMode::Local => "local",
            BindMode::Public => "public",
            BindMode::Custom(_) => "custom",
        },
    );
    if let Some(url) = &config.backend.url {
        ui::kv("Backend", url);
    }
    println!();
    ui::info("Press Ctrl+C to stop");
    println!();

    digioh_gateway::start(&config).await?;

    Ok(())
}
