//! Session error types

use protocol::{GameRuleViolation, ProtocolError, TransportError, WireError};
use thiserror::Error;

use crate::game::TableError;

/// Why a session ended early. Each variant only ever ends its own session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Rule violation: {0}")]
    Rule(#[from] GameRuleViolation),

    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

impl From<WireError> for SessionError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Protocol(e) => SessionError::Protocol(e),
            WireError::Transport(e) => SessionError::Transport(e),
        }
    }
}

impl SessionError {
    /// The client hung up; not worth a warning
    pub fn is_disconnect(&self) -> bool {
        matches!(self, SessionError::Transport(e) if e.is_disconnect())
    }
}
