//! Blackjack LAN client binary

use anyhow::{Context, Result};
use blackjack::config::validate_stand_on;
use blackjack::player::validate_rounds;
use blackjack::{Auto, ClientSession, Config, DiscoveredServer, Interactive, OfferListener, TerminalPresenter};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "blackjack")]
#[command(version)]
#[command(about = "Blackjack LAN client - finds a server on the local network and plays", long_about = None)]
struct Args {
    /// Configuration file path (defaults are used if it does not exist)
    #[arg(short, long, default_value = "client.conf")]
    config: PathBuf,

    /// Team name sent to the server
    #[arg(short, long)]
    name: Option<String>,

    /// Rounds to play (1-255); asked for if not given
    #[arg(short, long)]
    rounds: Option<u32>,

    /// Play automatically instead of prompting
    #[arg(long)]
    auto: bool,

    /// Total at which the automatic player stands
    #[arg(long)]
    stand_on: Option<u8>,

    /// Connect to host:port directly, skipping discovery
    #[arg(short, long)]
    server: Option<String>,

    /// Disable colours
    #[arg(long)]
    no_color: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_default(&args.config).context("Failed to load configuration")?;
    if let Some(name) = args.name.filter(|n| !n.trim().is_empty()) {
        config.general.name = name;
    }
    if let Some(rounds) = args.rounds {
        config.general.rounds = Some(validate_rounds(rounds).context("Invalid --rounds")?);
    }
    if args.auto {
        config.general.auto_play = true;
    }
    if let Some(stand_on) = args.stand_on {
        config.general.stand_on = validate_stand_on(stand_on).context("Invalid --stand-on")?;
    }
    if args.no_color {
        config.output.use_colors = false;
    }

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(config.logging.filter(args.verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let mut presenter = TerminalPresenter::new(config.output.use_colors);
    presenter.welcome(&config.general.name);

    let mut console = Interactive::stdin();
    let rounds = match config.general.rounds {
        Some(rounds) => rounds,
        None => match console.ask_rounds().await.context("Failed to read round count")? {
            Some(rounds) => rounds,
            None => {
                println!("Goodbye! Thanks for playing!");
                return Ok(());
            }
        },
    };

    let server = match &args.server {
        Some(target) => direct(target).await?,
        None => discover(&config, &presenter).await?,
    };

    presenter.connecting(&server);
    let session = ClientSession::connect(
        server.addr,
        config.session.connect_timeout(),
        config.session.read_timeout(),
        rounds,
        &config.general.name,
    )
    .await
    .with_context(|| format!("Could not start a session with {}", server.addr))?;
    info!("Connected to {} at {}", server.name, server.addr);

    let stats = if config.general.auto_play {
        session.play(&mut Auto::new(config.general.stand_on), &mut presenter).await
    } else {
        session.play(&mut console, &mut presenter).await
    }
    .context("Session aborted")?;

    presenter.summary(rounds, &stats);
    Ok(())
}

async fn discover(config: &Config, presenter: &TerminalPresenter) -> Result<DiscoveredServer> {
    let listener = OfferListener::bind(config.discovery.port)
        .with_context(|| format!("Failed to listen on UDP port {}", config.discovery.port))?;
    presenter.listening(config.discovery.port);

    let server = listener.wait_for_offer(config.discovery.timeout()).await?;
    presenter.offer(&server);
    Ok(server)
}

async fn direct(target: &str) -> Result<DiscoveredServer> {
    let addr = tokio::net::lookup_host(target)
        .await
        .with_context(|| format!("Failed to resolve {}", target))?
        .next()
        .with_context(|| format!("No address found for {}", target))?;

    Ok(DiscoveredServer {
        name: target.to_string(),
        addr,
    })
}
