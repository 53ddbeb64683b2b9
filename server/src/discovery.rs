//! Offer broadcaster
//!
//! Discovery has no acknowledgment. The broadcaster repeats the same offer
//! every interval, and a send that fails is simply tried again next tick.

use protocol::{Message, Offer};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub struct Broadcaster {
    socket: UdpSocket,
    target: SocketAddr,
    offer: Offer,
    interval: Duration,
}

impl Broadcaster {
    pub fn new(socket: UdpSocket, target: SocketAddr, offer: Offer, interval: Duration) -> Self {
        Self {
            socket,
            target,
            offer,
            interval,
        }
    }

    pub fn offer(&self) -> &Offer {
        &self.offer
    }

    /// Broadcast forever
    pub async fn run(self) {
        let packet = self.offer.to_bytes();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Broadcasting offers for '{}' (tcp port {}) to {} every {:?}",
            self.offer.server_name, self.offer.tcp_port, self.target, self.interval
        );

        let mut sent: u64 = 0;
        loop {
            ticker.tick().await;
            // a send never outlives its tick
            match tokio::time::timeout(self.interval, self.socket.send_to(&packet, self.target)).await {
                Ok(Ok(_)) => {
                    sent += 1;
                    if sent == 1 {
                        debug!("First offer sent to {}", self.target);
                    }
                }
                Ok(Err(e)) => warn!("Failed to broadcast offer to {}: {}", self.target, e),
                Err(_) => warn!("Offer broadcast to {} timed out", self.target),
            }
        }
    }
}
