//! Client session errors

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use protocol::{GameRuleViolation, ProtocolError, ServerPayload, TransportError, WireError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Timed out connecting to {addr} after {limit:?}")]
    ConnectTimeout { addr: SocketAddr, limit: Duration },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Rule violation: {0}")]
    Rule(#[from] GameRuleViolation),

    /// The server sent something the round cannot contain at this point
    #[error("Out of sync with server: expected {expected}, got {got:?}")]
    Desync {
        expected: &'static str,
        got: ServerPayload,
    },

    #[error("Failed to read player input: {0}")]
    Input(#[source] io::Error),
}

impl From<WireError> for SessionError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Protocol(e) => SessionError::Protocol(e),
            WireError::Transport(e) => SessionError::Transport(e),
        }
    }
}
