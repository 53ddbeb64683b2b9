//! Protocol error types

use std::io::ErrorKind;
use std::time::Duration;
use thiserror::Error;

use crate::constants::MessageType;

/// Malformed bytes on the wire. Always fatal to the session that saw them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Short buffer: expected {expected} bytes, got {actual}")]
    ShortBuffer { expected: usize, actual: usize },

    #[error("Invalid magic cookie: {0:#010x}")]
    BadMagic(u32),

    #[error("Unknown message type {actual:#04x} (expected {expected:?})")]
    UnknownType { expected: MessageType, actual: u8 },

    #[error("Malformed field {field}: {value}")]
    MalformedField { field: &'static str, value: u32 },
}

/// Failures of the underlying connection
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can go wrong exchanging one message
#[derive(Error, Debug)]
pub enum WireError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl TransportError {
    /// True when the peer went away, whether by clean close or reset
    pub fn is_disconnect(&self) -> bool {
        match self {
            TransportError::ConnectionClosed => true,
            TransportError::Io(e) => matches!(
                e.kind(),
                ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
            ),
            TransportError::Timeout(_) => false,
        }
    }
}

impl WireError {
    /// True when the peer went away rather than misbehaved
    pub fn is_disconnect(&self) -> bool {
        matches!(self, WireError::Transport(e) if e.is_disconnect())
    }
}

/// Well-formed messages carrying values the game does not allow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameRuleViolation {
    #[error("Unknown decision {0:?}")]
    UnknownDecision(String),

    #[error("Session requested zero rounds")]
    ZeroRounds,

    #[error("Round count {0} is outside 1..=255")]
    RoundsOutOfRange(u32),
}
