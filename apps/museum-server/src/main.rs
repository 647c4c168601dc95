mod config;
mod logging;
mod middleware;
mod signals;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use museum::MuseumModule;
use museum::infra::storage::connect;
use tokio::net::TcpListener;

use crate::config::AppConfig;

/// Memorial Museum Server - REST backend for personalized memorial museums
#[derive(Parser)]
#[command(name = "museum-server")]
#[command(about = "Memorial Museum Server - REST backend for personalized memorial museums")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// In-memory database and mock collaborators
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate the database and start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Run database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (MUSEUM__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.override_port(port);
    }
    if cli.mock {
        config.apply_mock_profile();
    }

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_pretty_json()?);
        return Ok(());
    }

    logging::init_logging(&config.logging, cli.verbose)?;
    config.validate(cli.mock)?;

    // Dispatch subcommands (default: run)
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => {
            tracing::info!("Checking configuration...");
            println!("Configuration is valid");
            Ok(())
        }
        Commands::Migrate => {
            let db = connect(&config.database.url, config.database.max_connections).await?;
            museum::migrate(&db).await
        }
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Memorial Museum Server starting");

    let db = connect(&config.database.url, config.database.max_connections).await?;
    let module = MuseumModule::init(db, &config.museum).await?;
    module.migrate().await?;

    let router = middleware::apply_middleware_stack(module.register_rest(), &config.server)?;
    let listener = TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            match signals::wait_for_shutdown().await {
                Ok(signal) => tracing::debug!(signal, "graceful shutdown started"),
                Err(e) => tracing::error!(error = %e, "signal handling failed; shutting down"),
            }
        })
        .await?;

    tracing::info!("Memorial Museum Server stopped");
    Ok(())
}
