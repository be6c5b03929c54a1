//! Midway: game server for Enterprise.
//!
//! Opens the lobby, starts the game when the operator presses Enter (or once
//! enough ships have joined) and runs until every ship has left.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use enterprise::services::MidwayServer;
use enterprise::Settings;

/// Command-line interface for the Midway server.
#[derive(Parser, Debug)]
#[command(name = "midway")]
#[command(about = "Midway - WW2 naval combat server for Enterprise")]
struct Cli {
    /// Path to a configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Start automatically once this many ships have joined
    #[arg(short, long)]
    min_players: Option<usize>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves when the operator presses Enter
async fn wait_for_enter() {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines.next_line().await {
        Ok(Some(_)) => {}
        // Without a console only min_players can start the game
        Ok(None) | Err(_) => std::future::pending::<()>().await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().ok();
    let mut settings = Settings::load(working_dir.as_deref(), cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(bind) = cli.bind {
        settings.server.bind = bind;
    }
    if let Some(min_players) = cli.min_players {
        settings.server.min_players = Some(min_players);
    }

    let server = MidwayServer::bind(settings.server.clone()).await?;
    tracing::info!("Midway is listening on {}", server.local_addr()?);
    match settings.server.min_players {
        Some(n) => tracing::info!("Press Enter to start, or wait for {} ships", n),
        None => tracing::info!("Press Enter to start the game"),
    }

    tokio::select! {
        res = server.run(wait_for_enter()) => res?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["midway", "--port", "4000", "--min-players", "2"]);
        assert_eq!(cli.port, Some(4000));
        assert_eq!(cli.min_players, Some(2));
        assert!(cli.config.is_none());
        assert!(cli.bind.is_none());
    }
}
