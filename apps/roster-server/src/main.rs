use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use roster_server::{AppConfig, CliArgs, logging, server, signals};
use tokio_util::sync::CancellationToken;

/// Roster Server - student records REST service
#[derive(Parser)]
#[command(name = "roster-server")]
#[command(about = "Roster Server - student records REST service")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON, secrets redacted) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database instead of PostgreSQL
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.clone(),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // 1) defaults -> 2) YAML (if provided) -> 3) env -> 4) CLI overrides
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_cli_overrides(&args);
    config.validate()?;

    logging::init_logging(&config.logging);

    if args.print_config {
        println!("Effective configuration:\n{}", config.to_json()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    println!("Configuration is valid");
    println!("{}", config.to_json()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mock = config.database.dsn.as_deref() == Some("sqlite::memory:"),
        "Roster server starting"
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(err) = signals::wait_for_shutdown().await {
            tracing::error!(error = %err, "Signal handling failed, shutting down");
        }
        signal_cancel.cancel();
    });

    server::run(config, cancel).await
}
