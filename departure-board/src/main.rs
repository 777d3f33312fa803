use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use departure_board::config::{AppConfig, DEFAULT_CONFIG_PATH};
use departure_board::display::TerminalRenderer;
use departure_board::refresh::{Orchestrator, SystemClock};
use departure_board::transport::TransportClient;

/// Live departure countdowns for a handful of bus and tram lines.
#[derive(Parser)]
#[command(name = "departure-board", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "DEPARTURE_BOARD_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the board until interrupted (the default).
    Run,
    /// Look up station ids by name.
    Locate {
        query: String,
        /// Maximum number of matches.
        #[arg(long, default_value_t = 3)]
        results: u8,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("departure_board=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    config.apply_env();

    let client = match TransportClient::new(config.transport_config()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to create HTTP client");
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config, client).await,
        Command::Locate { query, results } => locate(&client, &query, results).await,
    }
}

async fn run(config: AppConfig, client: TransportClient) {
    let settings = match config.to_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for interrupt, running until killed");
            std::future::pending::<()>().await;
        }
        info!("interrupt received, shutting down");
        let _ = shutdown_tx.send(true);
    });

    let orchestrator = Orchestrator::new(settings, client, TerminalRenderer::stdout(), SystemClock);
    orchestrator.run(shutdown_rx).await;
}

async fn locate(client: &TransportClient, query: &str, results: u8) {
    let matches = match client.locate(query, results).await {
        Ok(matches) => matches,
        Err(e) => {
            error!(error = %e, query, "station lookup failed");
            std::process::exit(1);
        }
    };

    if matches.is_empty() {
        println!("No stations found for {query:?}");
        return;
    }

    for station in matches {
        match (station.latitude, station.longitude) {
            (Some(lat), Some(lon)) => println!("{}  {}  ({lat:.5}, {lon:.5})", station.id, station.name),
            _ => println!("{}  {}", station.id, station.name),
        }
    }
}
