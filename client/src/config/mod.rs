//! Client configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Team name sent in the request
    #[serde(default = "default_name")]
    pub name: String,
    /// Rounds to request; asked for interactively when unset
    #[serde(default)]
    pub rounds: Option<u8>,
    /// Let the automatic player decide instead of prompting
    #[serde(default)]
    pub auto_play: bool,
    /// Automatic player stands at or above this total
    #[serde(default = "default_stand_on")]
    pub stand_on: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_discovery_port")]
    pub port: u16,
    #[serde(default = "default_discovery_timeout_sec")]
    pub timeout_sec: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_connect_timeout_sec")]
    pub connect_timeout_sec: u64,
    #[serde(default = "default_read_timeout_sec")]
    pub read_timeout_sec: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub use_colors: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_name() -> String {
    "Anonymous".to_string()
}

fn default_stand_on() -> u8 {
    protocol::DEALER_STANDS_ON
}

fn default_discovery_port() -> u16 {
    protocol::DISCOVERY_PORT
}

fn default_discovery_timeout_sec() -> u64 {
    10
}

fn default_connect_timeout_sec() -> u64 {
    5
}

fn default_read_timeout_sec() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

// the presenter owns stdout; logs stay quiet unless asked for
fn default_level() -> String {
    "warn".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            rounds: None,
            auto_play: false,
            stand_on: default_stand_on(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: default_discovery_port(),
            timeout_sec: default_discovery_timeout_sec(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_sec: default_connect_timeout_sec(),
            read_timeout_sec: default_read_timeout_sec(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::parse(&content)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content).context("Failed to parse config file")?;

        if config.general.name.trim().is_empty() {
            config.general.name = default_name();
        }
        if config.general.rounds == Some(0) {
            anyhow::bail!("general.rounds must be between 1 and 255");
        }
        validate_stand_on(config.general.stand_on).context("Invalid general.stand_on")?;

        Ok(config)
    }
}

/// Threshold for the automatic player, from the config file or `--stand-on`
pub fn validate_stand_on(stand_on: u8) -> Result<u8> {
    if !(2..=protocol::BLACKJACK).contains(&stand_on) {
        anyhow::bail!("stand-on total must be between 2 and {}, got {}", protocol::BLACKJACK, stand_on);
    }
    Ok(stand_on)
}

impl LoggingConfig {
    /// `-v` wins over `RUST_LOG`, which wins over `level`
    pub fn filter(&self, verbose: u8, rust_log: Option<&str>) -> EnvFilter {
        let level = match verbose {
            0 => match rust_log.filter(|directives| !directives.trim().is_empty()) {
                Some(directives) => return EnvFilter::new(directives),
                None => self.level.parse().unwrap_or(Level::WARN),
            },
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        EnvFilter::default().add_directive(level.into())
    }
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}

impl SessionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_sec)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_sec)
    }
}
