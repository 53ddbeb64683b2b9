//! Server configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
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
    pub game: GameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    /// 0 lets the OS pick a port; the chosen one is advertised in offers
    #[serde(default)]
    pub tcp_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_broadcast_address")]
    pub broadcast_address: IpAddr,
    #[serde(default = "default_discovery_port")]
    pub port: u16,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_handshake_timeout_sec")]
    pub handshake_timeout_sec: u64,
    #[serde(default = "default_decision_timeout_sec")]
    pub decision_timeout_sec: u64,
    #[serde(default = "default_io_timeout_sec")]
    pub io_timeout_sec: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameConfig {
    /// Fixed shuffle seed; session N shuffles with `seed + N`
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_name() -> String {
    "Blackjack Server".to_string()
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_broadcast_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::BROADCAST)
}

fn default_discovery_port() -> u16 {
    protocol::DISCOVERY_PORT
}

fn default_interval_ms() -> u64 {
    protocol::OFFER_INTERVAL.as_millis() as u64
}

fn default_handshake_timeout_sec() -> u64 {
    10
}

fn default_decision_timeout_sec() -> u64 {
    60
}

fn default_io_timeout_sec() -> u64 {
    10
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            bind_address: default_bind_address(),
            tcp_port: 0,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            broadcast_address: default_broadcast_address(),
            port: default_discovery_port(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_sec: default_handshake_timeout_sec(),
            decision_timeout_sec: default_decision_timeout_sec(),
            io_timeout_sec: default_io_timeout_sec(),
        }
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
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        if config.general.name.trim().is_empty() {
            anyhow::bail!("general.name must not be empty");
        }
        if config.discovery.interval_ms == 0 {
            anyhow::bail!("discovery.interval_ms must be greater than zero");
        }

        Ok(config)
    }
}

impl DiscoveryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl LoggingConfig {
    /// Subscriber filter. Verbosity flags beat `RUST_LOG`, which beats `level`
    pub fn filter(&self, verbose: u8, rust_log: Option<&str>) -> EnvFilter {
        let level = match verbose {
            0 => match rust_log.filter(|directives| !directives.trim().is_empty()) {
                Some(directives) => return EnvFilter::new(directives),
                None => self.level.parse().unwrap_or(Level::INFO),
            },
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        EnvFilter::default().add_directive(level.into())
    }
}

impl SessionConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_sec)
    }

    pub fn decision_timeout(&self) -> Duration {
        Duration::from_secs(self.decision_timeout_sec)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.general.name, "Blackjack Server");
        assert_eq!(config.general.tcp_port, 0);
        assert_eq!(config.discovery.port, 13122);
        assert_eq!(config.discovery.interval(), Duration::from_secs(1));
        assert_eq!(config.session.decision_timeout(), Duration::from_secs(60));
        assert_eq!(config.game.seed, None);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [general]
            name = "Casino Royale"
            tcp_port = 4000

            [discovery]
            broadcast_address = "192.168.1.255"

            [game]
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.general.name, "Casino Royale");
        assert_eq!(config.general.tcp_port, 4000);
        assert_eq!(
            config.discovery.broadcast_address,
            "192.168.1.255".parse::<IpAddr>().unwrap()
        );
        assert!(config.discovery.enabled);
        assert_eq!(config.game.seed, Some(42));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = Config::parse("[discovery]\ninterval_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("interval_ms"));
    }

    #[test]
    fn test_rust_log_beats_configured_level() {
        let config = Config::parse("[logging]\nlevel = \"warn\"\n").unwrap();
        let filter = config.logging.filter(0, Some("blackjack_server=debug")).to_string();
        assert!(filter.contains("blackjack_server=debug"));
        assert!(!filter.to_lowercase().contains("warn"));

        let filter = config.logging.filter(0, None).to_string().to_lowercase();
        assert!(filter.contains("warn"));

        let filter = config.logging.filter(2, Some("blackjack_server=debug")).to_string().to_lowercase();
        assert!(filter.contains("trace"));
    }

    #[test]
    fn test_missing_default_file_is_fine() {
        let config = Config::load_or_default("/nonexistent/server.conf").unwrap();
        assert!(config.discovery.enabled);
    }
}
