//! Blackjack LAN server binary

use anyhow::{Context, Result};
use blackjack_server::{Config, Server};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version)]
#[command(about = "Blackjack LAN server - broadcasts offers and deals to every client", long_about = None)]
struct Args {
    /// Configuration file path (defaults are used if it does not exist)
    #[arg(short, long, default_value = "server.conf")]
    config: PathBuf,

    /// Server name advertised in offers
    #[arg(short, long)]
    name: Option<String>,

    /// TCP port for game sessions (0 picks a free port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Fixed shuffle seed, for repeatable games
    #[arg(long)]
    seed: Option<u64>,

    /// Do not broadcast offers
    #[arg(long)]
    no_discovery: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_default(&args.config).context("Failed to load configuration")?;
    if let Some(name) = args.name {
        config.general.name = name;
    }
    if let Some(port) = args.port {
        config.general.tcp_port = port;
    }
    if args.seed.is_some() {
        config.game.seed = args.seed;
    }
    if args.no_discovery {
        config.discovery.enabled = false;
    }

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(config.logging.filter(args.verbose, rust_log.as_deref()))
        .init();

    info!("Starting blackjack server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", args.config);
    if let Some(seed) = config.game.seed {
        info!("Shuffling with fixed seed {}", seed);
    }

    let server = Server::bind(&config).await?;

    tokio::select! {
        _ = server.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
            info!("Shutting down");
        }
    }

    Ok(())
}
