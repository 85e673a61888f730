//! digiOH CLI - run and inspect the site gateway.

mod commands;
mod ui;

use clap::{Parser, Subcommand};
use digioh_core::Config;
use digioh_core::config::LogFormat;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "digioh")]
#[command(about = "digiOH - events site gateway and admin access tools")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address (local, public, or IP)
        #[arg(long)]
        bind: Option<String>,

        /// Start even if the port looks busy
        #[arg(long)]
        force: bool,
    },

    /// Show gateway and backend status
    Status {
        /// Show all details
        #[arg(long)]
        all: bool,
    },

    /// Run configuration and backend checks
    Doctor {
        /// Write a config template if none exists
        #[arg(long, alias = "fix")]
        repair: bool,
    },

    /// Print the role and capability table
    Policy,

    /// Sign in and show what the admin area would offer
    Whoami {
        /// Account e-mail
        #[arg(long)]
        email: String,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Config::load_default().map(|c| c.settings).unwrap_or_default();
    init_tracing(
        cli.verbose || settings.debug,
        cli.json_logs || settings.log_format == LogFormat::Json,
    );

    let Some(command) = cli.command else {
        ui::banner();
        commands::run_status(commands::status::StatusArgs::default()).await?;
        return Ok(());
    };

    match command {
        Commands::Serve { port, bind, force } => {
            commands::run_serve(commands::serve::ServeArgs { port, bind, force }).await?;
        }
        Commands::Status { all } => {
            commands::run_status(commands::status::StatusArgs { all }).await?;
        }
        Commands::Doctor { repair } => {
            commands::run_doctor(commands::doctor::DoctorArgs { repair }).await?;
        }
        Commands::Policy => commands::run_policy(),
        Commands::Whoami { email } => {
            commands::run_whoami(commands::whoami::WhoamiArgs { email }).await?;
        }
    }

    Ok(())
}
