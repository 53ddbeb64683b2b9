//! Wire message structures
//!
//! Every message is a fixed-length record: magic cookie (4 bytes, big-endian),
//! type tag (1 byte), then the message fields. There is no length prefix and
//! no version field, so any layout change here is a breaking wire change.

use crate::constants::*;
use crate::error::ProtocolError;
use crate::game::{Card, Decision, RoundResult, Suit};
use crate::text::{decode_fixed, encode_fixed, truncate};
use crate::MAGIC_COOKIE;

/// A fixed-length wire message
pub trait Message: Sized {
    /// Type tag expected when decoding this message
    const TYPE: MessageType;

    /// Exact encoded length
    const SIZE: usize;

    fn to_bytes(&self) -> Vec<u8>;

    /// Decode from the first `SIZE` bytes of `bytes`
    fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError>;
}

fn write_header(bytes: &mut Vec<u8>, message_type: MessageType) {
    bytes.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
    bytes.push(message_type.to_u8());
}

/// Check length, magic cookie and type tag, in that order
fn check_header(bytes: &[u8], size: usize, expected: MessageType) -> Result<(), ProtocolError> {
    if bytes.len() < size {
        return Err(ProtocolError::ShortBuffer {
            expected: size,
            actual: bytes.len(),
        });
    }

    let magic = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if magic != MAGIC_COOKIE {
        return Err(ProtocolError::BadMagic(magic));
    }

    match MessageType::from_u8(bytes[4]) {
        Some(actual) if actual == expected => Ok(()),
        _ => Err(ProtocolError::UnknownType {
            expected,
            actual: bytes[4],
        }),
    }
}

/// OFFER: server advertisement, broadcast over UDP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    /// TCP port the server accepts sessions on
    pub tcp_port: u16,
    /// Server name, at most 32 bytes
    pub server_name: String,
}

impl Offer {
    /// Build an offer; the name is truncated to fit the wire field
    pub fn new(tcp_port: u16, server_name: &str) -> Self {
        Self {
            tcp_port,
            server_name: truncate(server_name, NAME_LEN).to_string(),
        }
    }
}

impl Message for Offer {
    const TYPE: MessageType = MessageType::Offer;
    const SIZE: usize = OFFER_SIZE;

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        write_header(&mut bytes, Self::TYPE);
        bytes.extend_from_slice(&self.tcp_port.to_be_bytes());
        bytes.extend_from_slice(&encode_fixed::<NAME_LEN>(&self.server_name, NAME_PAD));
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_header(bytes, Self::SIZE, Self::TYPE)?;
        let tcp_port = u16::from_be_bytes([bytes[5], bytes[6]]);
        let server_name = decode_fixed(&bytes[7..7 + NAME_LEN], NAME_PAD);
        Ok(Self { tcp_port, server_name })
    }
}

/// REQUEST: first message on a new connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Number of rounds to play
    pub rounds: u8,
    /// Client (team) name, at most 32 bytes
    pub client_name: String,
}

impl Request {
    pub fn new(rounds: u8, client_name: &str) -> Self {
        Self {
            rounds,
            client_name: truncate(client_name, NAME_LEN).to_string(),
        }
    }
}

impl Message for Request {
    const TYPE: MessageType = MessageType::Request;
    const SIZE: usize = REQUEST_SIZE;

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        write_header(&mut bytes, Self::TYPE);
        bytes.push(self.rounds);
        bytes.extend_from_slice(&encode_fixed::<NAME_LEN>(&self.client_name, NAME_PAD));
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_header(bytes, Self::SIZE, Self::TYPE)?;
        let rounds = bytes[5];
        let client_name = decode_fixed(&bytes[6..6 + NAME_LEN], NAME_PAD);
        Ok(Self { rounds, client_name })
    }
}

/// PAYLOAD (server to client): one dealt card or one round outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerPayload {
    pub result: RoundResult,
    /// 1..=13, or 0 when no card is attached
    pub rank: u16,
    /// 0..=3, or 0 when no card is attached
    pub suit: u8,
}

impl ServerPayload {
    /// A dealt card; the round continues
    pub fn card(card: Card) -> Self {
        Self {
            result: RoundResult::Continue,
            rank: u16::from(card.rank()),
            suit: card.suit() as u8,
        }
    }

    /// An outcome notification, carrying no card
    pub fn outcome(result: RoundResult) -> Self {
        Self {
            result,
            rank: 0,
            suit: 0,
        }
    }

    /// The attached card, if any
    pub fn to_card(&self) -> Option<Card> {
        let rank = u8::try_from(self.rank).ok()?;
        Card::new(rank, Suit::from_u8(self.suit)?)
    }
}

impl Message for ServerPayload {
    const TYPE: MessageType = MessageType::Payload;
    const SIZE: usize = SERVER_PAYLOAD_SIZE;

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        write_header(&mut bytes, Self::TYPE);
        bytes.push(self.result as u8);
        bytes.extend_from_slice(&self.rank.to_be_bytes());
        bytes.push(self.suit);
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_header(bytes, Self::SIZE, Self::TYPE)?;

        let result = RoundResult::from_u8(bytes[5]).ok_or(ProtocolError::MalformedField {
            field: "result",
            value: u32::from(bytes[5]),
        })?;

        let rank = u16::from_be_bytes([bytes[6], bytes[7]]);
        if rank > 13 {
            return Err(ProtocolError::MalformedField {
                field: "rank",
                value: u32::from(rank),
            });
        }

        let suit = bytes[8];
        if Suit::from_u8(suit).is_none() || (rank == 0 && suit != 0) {
            return Err(ProtocolError::MalformedField {
                field: "suit",
                value: u32::from(suit),
            });
        }

        Ok(Self { result, rank, suit })
    }
}

/// PAYLOAD (client to server): one player decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPayload {
    /// Decision text with padding stripped; interpreted by [`Decision::parse`]
    pub decision: String,
}

impl ClientPayload {
    pub fn new(decision: Decision) -> Self {
        Self {
            decision: decision.as_str().to_string(),
        }
    }

    pub fn decision(&self) -> Result<Decision, crate::error::GameRuleViolation> {
        Decision::parse(&self.decision)
    }
}

impl Message for ClientPayload {
    const TYPE: MessageType = MessageType::Payload;
    const SIZE: usize = CLIENT_PAYLOAD_SIZE;

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        write_header(&mut bytes, Self::TYPE);
        bytes.extend_from_slice(&encode_fixed::<DECISION_LEN>(&self.decision, DECISION_PAD));
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        check_header(bytes, Self::SIZE, Self::TYPE)?;
        let decision = decode_fixed(&bytes[5..5 + DECISION_LEN], DECISION_PAD);
        Ok(Self { decision })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_sizes() {
        assert_eq!(Offer::new(1, "x").to_bytes().len(), 39);
        assert_eq!(Request::new(1, "x").to_bytes().len(), 38);
        assert_eq!(ServerPayload::outcome(RoundResult::Win).to_bytes().len(), 9);
        assert_eq!(ClientPayload::new(Decision::Hit).to_bytes().len(), 10);
    }

    #[test]
    fn test_offer_layout() {
        let bytes = Offer::new(0x1234, "Dealer").to_bytes();
        assert_eq!(&bytes[0..4], &[0xAB, 0xCD, 0xDC, 0xBA]);
        assert_eq!(bytes[4], 0x02);
        assert_eq!(&bytes[5..7], &[0x12, 0x34]);
        assert_eq!(&bytes[7..13], b"Dealer");
        assert!(bytes[13..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_offer_roundtrip() {
        let offer = Offer::new(54321, "Blackjack Server");
        assert_eq!(Offer::from_bytes(&offer.to_bytes()).unwrap(), offer);
    }

    #[test]
    fn test_offer_port_sweep() {
        for port in (0..=u16::MAX).step_by(97).chain([1, 1024, 13117, u16::MAX]) {
            let decoded = Offer::from_bytes(&Offer::new(port, "srv").to_bytes()).unwrap();
            assert_eq!(decoded.tcp_port, port);
        }
    }

    #[test]
    fn test_trailing_spaces_in_names_survive() {
        let request = Request::new(1, "Team ");
        let decoded = Request::from_bytes(&request.to_bytes()).unwrap();
        assert_eq!(decoded.client_name, "Team ");
        assert_eq!(decoded, request);

        let offer = Offer::new(4000, "  Casino  ");
        assert_eq!(Offer::from_bytes(&offer.to_bytes()).unwrap().server_name, "  Casino  ");
    }

    #[test]
    fn test_long_name_is_truncated_not_overflowed() {
        let long = "N".repeat(40);
        let request = Request::new(3, &long);
        assert_eq!(request.client_name.len(), 32);
        let bytes = request.to_bytes();
        assert_eq!(bytes.len(), 38);
        assert_eq!(Request::from_bytes(&bytes).unwrap(), request);
    }

    #[test]
    fn test_request_roundtrip() {
        for rounds in 1..=u8::MAX {
            let request = Request::new(rounds, "Team Ace");
            assert_eq!(Request::from_bytes(&request.to_bytes()).unwrap(), request);
        }
    }

    #[test]
    fn test_server_payload_layout() {
        let card = Card::new(13, Suit::Clubs).unwrap();
        let bytes = ServerPayload::card(card).to_bytes();
        assert_eq!(bytes[4], 0x04);
        assert_eq!(bytes[5], 0x00);
        assert_eq!(&bytes[6..8], &[0x00, 0x0D]);
        assert_eq!(bytes[8], 0x02);

        let decoded = ServerPayload::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.to_card(), Some(card));
        assert_eq!(decoded.result, RoundResult::Continue);
    }

    #[test]
    fn test_every_card_roundtrips() {
        for suit in Suit::ALL {
            for rank in 1..=13 {
                let card = Card::new(rank, suit).unwrap();
                let payload = ServerPayload::card(card);
                let decoded = ServerPayload::from_bytes(&payload.to_bytes()).unwrap();
                assert_eq!(decoded, payload);
                assert_eq!(decoded.to_card(), Some(card));
            }
        }
    }

    #[test]
    fn test_every_wire_field_combination() {
        for result in 0u8..=3 {
            for rank in 0u16..=13 {
                for suit in 0u8..=3 {
                    let mut bytes = ServerPayload::outcome(RoundResult::Win).to_bytes();
                    bytes[5] = result;
                    bytes[6..8].copy_from_slice(&rank.to_be_bytes());
                    bytes[8] = suit;

                    let decoded = ServerPayload::from_bytes(&bytes);
                    if rank == 0 && suit != 0 {
                        assert!(matches!(decoded, Err(ProtocolError::MalformedField { field: "suit", .. })));
                        continue;
                    }
                    let decoded = decoded.unwrap();
                    assert_eq!(decoded.result as u8, result);
                    assert_eq!((decoded.rank, decoded.suit), (rank, suit));
                    assert_eq!(decoded.to_bytes(), bytes);
                }
            }
        }
    }

    #[test]
    fn test_outcome_has_no_card() {
        let payload = ServerPayload::outcome(RoundResult::Push);
        let decoded = ServerPayload::from_bytes(&payload.to_bytes()).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decoded.to_card(), None);
    }

    #[test]
    fn test_client_payload_padding() {
        let bytes = ClientPayload::new(Decision::Hit).to_bytes();
        assert_eq!(&bytes[5..], b"HIT  ");
        let decoded = ClientPayload::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.decision, "HIT");
        assert_eq!(decoded.decision().unwrap(), Decision::Hit);

        let stand = ClientPayload::from_bytes(&ClientPayload::new(Decision::Stand).to_bytes());
        assert_eq!(stand.unwrap().decision().unwrap(), Decision::Stand);

        // a peer padding with NUL is still understood
        let mut bytes = ClientPayload::new(Decision::Hit).to_bytes();
        bytes[8] = 0;
        bytes[9] = 0;
        assert_eq!(ClientPayload::from_bytes(&bytes).unwrap().decision().unwrap(), Decision::Hit);
    }

    #[test]
    fn test_short_buffer() {
        let bytes = Offer::new(80, "x").to_bytes();
        assert_eq!(
            Offer::from_bytes(&bytes[..38]),
            Err(ProtocolError::ShortBuffer {
                expected: 39,
                actual: 38
            })
        );
        assert!(matches!(
            ServerPayload::from_bytes(&[]),
            Err(ProtocolError::ShortBuffer { .. })
        ));
    }

    #[test]
    fn test_any_flipped_magic_byte_is_rejected() {
        let good = Request::new(2, "x").to_bytes();
        for i in 0..4 {
            for bit in 0..8 {
                let mut bytes = good.clone();
                bytes[i] ^= 1 << bit;
                assert!(matches!(
                    Request::from_bytes(&bytes),
                    Err(ProtocolError::BadMagic(_))
                ));
            }
        }
    }

    #[test]
    fn test_type_is_checked_per_context() {
        let request = Request::new(2, "x").to_bytes();
        // a 38-byte request is long enough to be mistaken for an offer prefix
        let mut padded = request.clone();
        padded.push(0);
        assert_eq!(
            Offer::from_bytes(&padded),
            Err(ProtocolError::UnknownType {
                expected: MessageType::Offer,
                actual: 0x03
            })
        );

        let mut payload = ClientPayload::new(Decision::Stand).to_bytes();
        payload[4] = 0x7F;
        assert!(matches!(
            ClientPayload::from_bytes(&payload),
            Err(ProtocolError::UnknownType { actual: 0x7F, .. })
        ));
    }

    #[test]
    fn test_malformed_server_payload_fields() {
        let mut bytes = ServerPayload::outcome(RoundResult::Win).to_bytes();
        bytes[5] = 9;
        assert_eq!(
            ServerPayload::from_bytes(&bytes),
            Err(ProtocolError::MalformedField {
                field: "result",
                value: 9
            })
        );

        let mut bytes = ServerPayload::card(Card::new(5, Suit::Hearts).unwrap()).to_bytes();
        bytes[7] = 14;
        assert!(matches!(
            ServerPayload::from_bytes(&bytes),
            Err(ProtocolError::MalformedField { field: "rank", .. })
        ));

        bytes[7] = 5;
        bytes[8] = 4;
        assert!(matches!(
            ServerPayload::from_bytes(&bytes),
            Err(ProtocolError::MalformedField { field: "suit", .. })
        ));
    }

    #[test]
    fn test_datagram_tail_is_ignored() {
        let mut bytes = Offer::new(2000, "srv").to_bytes();
        bytes.extend_from_slice(&[0xFF; 16]);
        assert_eq!(Offer::from_bytes(&bytes).unwrap(), Offer::new(2000, "srv"));
    }
}
