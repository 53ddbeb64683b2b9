//! Blackjack LAN server
//!
//! Advertises itself over UDP broadcast and deals blackjack to every client
//! that connects over TCP, each in an isolated session.

pub mod config;
pub mod discovery;
pub mod error;
pub mod game;
pub mod net;
pub mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use protocol::{NAME_LEN, Offer};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::Config;
pub use discovery::Broadcaster;
pub use error::SessionError;
pub use session::SessionManager;

/// A bound server, ready to run
pub struct Server {
    listener: TcpListener,
    broadcaster: Option<Broadcaster>,
    sessions: Arc<SessionManager>,
}

impl Server {
    /// Bind the session listener and, if enabled, the broadcast socket
    pub async fn bind(config: &Config) -> Result<Self> {
        let listener = net::bind_listener(config.general.bind_address, config.general.tcp_port)?;
        let tcp_port = listener
            .local_addr()
            .context("Failed to read listener address")?
            .port();

        if config.general.name.len() > NAME_LEN {
            warn!(
                "Server name '{}' is longer than {} bytes and will be truncated in offers",
                config.general.name, NAME_LEN
            );
        }
        let offer = Offer::new(tcp_port, &config.general.name);

        let broadcaster = if config.discovery.enabled {
            let socket = net::bind_broadcast_socket()?;
            let target = SocketAddr::new(config.discovery.broadcast_address, config.discovery.port);
            Some(Broadcaster::new(socket, target, offer, config.discovery.interval()))
        } else {
            info!("Discovery disabled; clients must connect to port {} directly", tcp_port);
            None
        };

        info!(
            "Server started, listening on IP address {} port {}",
            net::local_ip(),
            tcp_port
        );

        Ok(Self {
            listener,
            broadcaster,
            sessions: Arc::new(SessionManager::new(config.session.clone(), &config.game)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        self.sessions.clone()
    }

    /// Broadcast offers and serve sessions until the future is dropped.
    /// Sessions already spawned keep running on the runtime.
    pub async fn run(self) {
        let serve = self.sessions.serve(self.listener);
        match self.broadcaster {
            Some(broadcaster) => {
                tokio::select! {
                    _ = broadcaster.run() => {}
                    _ = serve => {}
                }
            }
            None => serve.await,
        }
    }
}
