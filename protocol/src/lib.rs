//! Blackjack LAN Protocol Library
//!
//! Shared protocol definitions for the blackjack server and client.
//! This includes the four fixed-layout wire messages, exact-length stream
//! reads, and the card vocabulary both ends use to track a round.

pub mod constants;
pub mod error;
pub mod game;
pub mod packets;
pub mod stream;
pub mod text;

pub use constants::*;
pub use error::{GameRuleViolation, ProtocolError, TransportError, WireError};
pub use game::{Card, Decision, Hand, RoundResult, Stats, Suit};
pub use packets::{ClientPayload, Message, Offer, Request, ServerPayload};
pub use stream::{MessageStream, read_exactly};

/// Magic cookie that starts every message: 0xABCDDCBA
pub const MAGIC_COOKIE: u32 = 0xABCD_DCBA;

/// Well-known UDP port servers broadcast offers to
pub const DISCOVERY_PORT: u16 = 13122;

/// Period between two offer broadcasts
pub const OFFER_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);
