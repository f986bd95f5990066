//! AI request broker service
//!
//! Loads configuration, opens storage, builds the provider adapters and
//! serves the broker over HTTP.

use ai_request_broker::config::Config;
use ai_request_broker::server::ServerBuilder;
use ai_request_broker::storage::database::Database;
use ai_request_broker::utils::logging::init_tracing;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "broker", version, about = "AI request broker")]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "BROKER_CONFIG", default_value = "config/broker.yaml")]
    config: PathBuf,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Run database migrations and exit
    #[arg(long)]
    migrate_only: bool,
}

async fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = if cli.config.exists() {
        Config::from_file(&cli.config)
            .await
            .with_context(|| format!("loading {}", cli.config.display()))?
    } else {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    };

    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli).await?;
    init_tracing(&config.logging);
    if !cli.config.exists() {
        warn!(
            "Configuration file {} not found, using defaults",
            cli.config.display()
        );
    }

    if cli.migrate_only {
        let database = Database::new(&config.storage.database)
            .await
            .context("connecting to database")?;
        database.migrate().await.context("running migrations")?;
        info!("Migrations complete");
        return Ok(());
    }

    info!(
        "Starting AI request broker v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.server.address()
    );
    let server = ServerBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("building server")?;
    server.start().await.context("running server")?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
