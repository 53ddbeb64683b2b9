//! Socket setup

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::{TcpListener, TcpSocket, UdpSocket};

/// Backlog for the session listener
const LISTEN_BACKLOG: u32 = 128;

/// UDP socket allowed to send to broadcast addresses
pub fn bind_broadcast_socket() -> Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .context("Failed to create UDP socket")?;
    socket
        .set_broadcast(true)
        .context("Failed to enable SO_BROADCAST")?;
    socket.set_nonblocking(true)?;

    let any = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);
    socket
        .bind(&any.into())
        .context("Failed to bind broadcast socket")?;

    UdpSocket::from_std(socket.into()).context("Failed to register broadcast socket")
}

/// TCP listener for game sessions; port 0 picks an ephemeral port
pub fn bind_listener(address: IpAddr, port: u16) -> Result<TcpListener> {
    let bind_addr = SocketAddr::new(address, port);
    let socket = match bind_addr {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    }
    .context("Failed to create TCP socket")?;

    socket.set_reuseaddr(true)?;
    socket
        .bind(bind_addr)
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    socket
        .listen(LISTEN_BACKLOG)
        .with_context(|| format!("Failed to listen on {}", bind_addr))
}

/// Address of the interface that routes off-host, for the startup banner.
///
/// No packet is sent: connecting a UDP socket only selects a route.
pub fn local_ip() -> IpAddr {
    let route_out = || -> std::io::Result<IpAddr> {
        let socket = std::net::UdpSocket::bind("0.0.0.0:0")?;
        socket.connect("8.8.8.8:80")?;
        Ok(socket.local_addr()?.ip())
    };
    route_out().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
