//! Main entry point for the Sports League service
//!
//! Runs the league HTTP API with logging and graceful shutdown, or imports
//! a CSV file of results and prints the resulting standings.

use anyhow::{Context, Result};
use clap::Parser;
use sports_league::config::{validate_config, AppConfig, PointsScheme};
use sports_league::import::ImportOptions;
use sports_league::service::{AppState, HttpServerConfig, LeagueServer};
use sports_league::types::Standing;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Sports League - game results, team points and standings
#[derive(Parser)]
#[command(
    name = "sports-league",
    version,
    about = "Track game results and derive team points and league standings",
    long_about = "Sports League records games between named teams, keeps each team's \
                 win/draw/loss counters and points consistent under edits and deletions, \
                 ranks the league, and imports results in bulk from CSV files."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// HTTP host override
    #[arg(long, value_name = "HOST", help = "Override HTTP bind host")]
    http_host: Option<String>,

    /// HTTP port override
    #[arg(long, value_name = "PORT", help = "Override HTTP server port")]
    http_port: Option<u16>,

    /// Snapshot file override
    #[arg(long, value_name = "FILE", help = "Persist the league to this JSON file")]
    snapshot: Option<PathBuf>,

    /// Points scheme override
    #[arg(
        long,
        value_name = "SCHEME",
        help = "Points scheme (standard, weighted)"
    )]
    points_scheme: Option<PointsScheme>,

    /// Import a CSV file, print the standings and exit
    #[arg(
        long,
        value_name = "FILE",
        help = "Import games from a CSV file, print the standings and exit"
    )]
    import: Option<PathBuf>,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("Sports League Service");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   HTTP: {}", config.http_addr());
    info!("   Points scheme: {}", config.points.scheme);
    match &config.storage.snapshot_path {
        Some(path) => info!("   Snapshot: {}", path.display()),
        None => info!("   Snapshot: none (in-memory only)"),
    }
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(http_host) = &args.http_host {
        config.service.http_host = http_host.clone();
    }

    if let Some(http_port) = args.http_port {
        config.service.http_port = http_port;
    }

    if let Some(snapshot) = &args.snapshot {
        config.storage.snapshot_path = Some(snapshot.clone());
    }

    if let Some(scheme) = args.points_scheme {
        config.points.scheme = scheme;
    }

    validate_config(&config)?;
    Ok(config)
}

/// Render standings as a fixed-width table
fn format_standings(standings: &[Standing]) -> String {
    let mut table = format!(
        "{:>4}  {:<30} {:>3} {:>3} {:>3} {:>3} {:>4}\n",
        "Rank", "Team", "P", "W", "D", "L", "Pts"
    );
    for standing in standings {
        table.push_str(&format!(
            "{:>4}  {:<30} {:>3} {:>3} {:>3} {:>3} {:>4}\n",
            standing.rank,
            standing.name,
            standing.played,
            standing.wins,
            standing.draws,
            standing.losses,
            standing.points
        ));
    }
    table
}

/// Import a CSV file and print the resulting table
async fn run_import(config: AppConfig, path: PathBuf) -> Result<bool> {
    let app_state = AppState::new(config).await?;
    let file = File::open(&path)
        .with_context(|| format!("Failed to open import file {}", path.display()))?;

    let options = ImportOptions::from(&app_state.config().import);
    let report = app_state
        .league_manager()
        .import_csv(file, &options)
        .await;

    for failure in &report.failures {
        eprintln!("line {}: {}", failure.line, failure.message);
    }
    if report.aborted {
        eprintln!("import aborted; {} rows not processed", report.skipped);
    }

    let standings = app_state.league_manager().standings()?;
    print!("{}", format_standings(&standings));

    info!(
        "Imported {} games from {} ({} rows failed)",
        report.imported,
        path.display(),
        report.failed()
    );
    Ok(report.is_clean())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (CLI args override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    if let Some(path) = args.import.clone() {
        match run_import(config, path).await {
            Ok(true) => return Ok(()),
            Ok(false) => std::process::exit(2),
            Err(e) => {
                error!("Import failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let app_state = match AppState::new(config.clone()).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        std::process::exit(1);
    }

    let server = Arc::new(LeagueServer::new(
        HttpServerConfig {
            host: config.service.http_host.clone(),
            port: config.service.http_port,
        },
        app_state.clone(),
    ));

    let server_task = {
        let server = server.clone();
        tokio::spawn(async move {
            if let Err(e) = server.start().await {
                error!("HTTP server failed: {:#}", e);
            }
        })
    };

    info!("Sports League Service is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    wait_for_shutdown_signal().await;
    info!("Shutdown signal received, beginning graceful shutdown...");

    server.stop();
    let shutdown = async {
        if let Err(e) = server_task.await {
            warn!("HTTP server task ended abnormally: {}", e);
        }
        app_state.shutdown().await
    };

    match tokio::time::timeout(config.shutdown_timeout(), shutdown).await {
        Ok(Ok(())) => info!("Graceful shutdown completed successfully"),
        Ok(Err(e)) => warn!("Shutdown completed with errors: {}", e),
        Err(_) => warn!("Shutdown timeout exceeded, forcing exit"),
    }

    info!("Sports League Service stopped");
    Ok(())
}
