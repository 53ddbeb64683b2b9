//! Offer listener
//!
//! The first well-formed offer wins. Anything else arriving on the port is
//! logged and skipped while the deadline keeps running.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use protocol::{Message, Offer};
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::debug;

/// Largest datagram worth reading; offers are far smaller
const RECV_BUFFER: usize = 1024;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("No server offer received within {0:?}")]
    Timeout(Duration),

    #[error("Discovery socket error: {0}")]
    Io(#[from] io::Error),
}

/// A server that answered with an offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredServer {
    pub name: String,
    /// Sender address of the offer with the advertised TCP port
    pub addr: SocketAddr,
}

pub struct OfferListener {
    socket: UdpSocket,
}

impl OfferListener {
    /// Listen on `port` on every interface. Several clients on one host may
    /// share the port.
    pub fn bind(port: u16) -> io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
        socket.set_reuse_port(true)?;
        socket.set_nonblocking(true)?;

        let any = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
        socket.bind(&any.into())?;

        Ok(Self {
            socket: UdpSocket::from_std(socket.into())?,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Wait for the first valid offer, or fail once `limit` has passed
    pub async fn wait_for_offer(&self, limit: Duration) -> Result<DiscoveredServer, DiscoveryError> {
        tokio::time::timeout(limit, self.next_offer())
            .await
            .map_err(|_| DiscoveryError::Timeout(limit))?
    }

    async fn next_offer(&self) -> Result<DiscoveredServer, DiscoveryError> {
        let mut buf = [0u8; RECV_BUFFER];
        loop {
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            match Offer::from_bytes(&buf[..len]) {
                Ok(offer) => {
                    debug!("Offer from {} ({}): tcp port {}", offer.server_name, from, offer.tcp_port);
                    return Ok(DiscoveredServer {
                        name: offer.server_name,
                        addr: SocketAddr::new(from.ip(), offer.tcp_port),
                    });
                }
                Err(e) => debug!("Ignoring {} byte datagram from {}: {}", len, from, e),
            }
        }
    }
}
