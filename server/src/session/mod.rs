//! Session management for connected players
//!
//! Every accepted connection runs in its own task and owns all of its game
//! state. The manager only holds read-only settings and a count of live
//! sessions, so one session failing cannot disturb another.

pub mod handshake;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use protocol::MessageStream;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::{GameConfig, SessionConfig};
use crate::error::SessionError;
use crate::game::{GameEngine, SessionReport, ShuffledShoe};

/// Pause after a failed accept, so a full fd table does not spin the loop
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct SessionManager {
    settings: SessionConfig,
    seed: Option<u64>,
    next_id: AtomicU64,
    active: AtomicUsize,
}

impl SessionManager {
    pub fn new(settings: SessionConfig, game: &GameConfig) -> Self {
        Self {
            settings,
            seed: game.seed,
            next_id: AtomicU64::new(1),
            active: AtomicUsize::new(0),
        }
    }

    /// Number of sessions currently being played
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Accept connections forever, one task per client
    pub async fn serve(self: Arc<Self>, listener: TcpListener) {
        loop {
            let (socket, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            if let Err(e) = socket.set_nodelay(true) {
                debug!("Failed to set TCP_NODELAY for {}: {}", peer, e);
            }

            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let manager = self.clone();
            let span = info_span!("session", id, %peer);
            tokio::spawn(
                async move {
                    debug!("Accepted connection");
                    manager.run_session(id, socket, peer).await;
                }
                .instrument(span),
            );
        }
    }

    /// Run one session to completion and log how it ended
    pub async fn run_session<S>(&self, id: u64, socket: S, peer: SocketAddr)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let _active = ActiveGuard::enter(&self.active);

        match self.play(id, socket).await {
            Ok(report) => info!(
                "Session with {} ({}) finished: {} rounds, {}W/{}L/{}P",
                report.client_name,
                peer,
                report.rounds,
                report.stats.wins,
                report.stats.losses,
                report.stats.pushes
            ),
            Err(e) if e.is_disconnect() => info!("Client {} disconnected: {}", peer, e),
            Err(e) => warn!("Session with {} aborted: {}", peer, e),
        }
    }

    /// Handshake, then the game itself. Dropping `socket` on error closes it.
    pub async fn play<S>(&self, id: u64, socket: S) -> Result<SessionReport, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut stream = MessageStream::new(socket, self.settings.io_timeout());
        let request = handshake::read_request(&mut stream, self.settings.handshake_timeout()).await?;
        info!("{} asked for {} rounds", request.client_name, request.rounds);

        let engine = GameEngine::new(
            stream,
            request.client_name,
            request.rounds,
            self.shoe_for(id),
            self.settings.decision_timeout(),
        );
        engine.run().await
    }

    fn shoe_for(&self, id: u64) -> ShuffledShoe {
        match self.seed {
            Some(seed) => ShuffledShoe::seeded(seed.wrapping_add(id)),
            None => ShuffledShoe::from_entropy(),
        }
    }
}

/// Counts a session as live for as long as it is held
struct ActiveGuard<'a>(&'a AtomicUsize);

impl<'a> ActiveGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}
