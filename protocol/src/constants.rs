//! Protocol constants and message type definitions

/// Message type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Server advertisement (UDP broadcast)
    Offer = 0x02,

    /// Session request, sent once by the client after connecting
    Request = 0x03,

    /// Card, outcome or decision; shared by both directions
    Payload = 0x04,
}

impl MessageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x02 => Some(MessageType::Offer),
            0x03 => Some(MessageType::Request),
            0x04 => Some(MessageType::Payload),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// magic(4) + type(1)
pub const HEADER_SIZE: usize = 5;

/// Width of the server and client name fields
pub const NAME_LEN: usize = 32;

/// Width of the player decision field
pub const DECISION_LEN: usize = 5;

/// Offer: header + tcp_port(2) + server_name(32)
pub const OFFER_SIZE: usize = HEADER_SIZE + 2 + NAME_LEN;

/// Request: header + rounds(1) + client_name(32)
pub const REQUEST_SIZE: usize = HEADER_SIZE + 1 + NAME_LEN;

/// Server payload: header + result(1) + rank(2) + suit(1)
pub const SERVER_PAYLOAD_SIZE: usize = HEADER_SIZE + 1 + 2 + 1;

/// Client payload: header + decision(5)
pub const CLIENT_PAYLOAD_SIZE: usize = HEADER_SIZE + DECISION_LEN;

/// Pad byte for name fields
pub const NAME_PAD: u8 = 0x00;

/// Pad byte for the decision field
pub const DECISION_PAD: u8 = b' ';

/// Dealer draws while below this total
pub const DEALER_STANDS_ON: u8 = 17;

/// Highest total that is not a bust
pub const BLACKJACK: u8 = 21;
