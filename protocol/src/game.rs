//! Card vocabulary shared by server and client
//!
//! Both ends derive the state of a round from message order alone, so they
//! need identical scoring rules. These types carry no I/O.

use std::fmt;

use crate::constants::{BLACKJACK, DEALER_STANDS_ON};
use crate::error::GameRuleViolation;

/// Card suits, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Suit::Hearts),
            1 => Some(Suit::Diamonds),
            2 => Some(Suit::Clubs),
            3 => Some(Suit::Spades),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }
}

/// A playing card. Rank 1 is the ace, 11..=13 are the face cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    rank: u8,
    suit: Suit,
}

impl Card {
    pub fn new(rank: u8, suit: Suit) -> Option<Self> {
        (1..=13).contains(&rank).then_some(Self { rank, suit })
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn is_ace(&self) -> bool {
        self.rank == 1
    }

    /// Hard value: aces count 1, face cards 10
    pub fn value(&self) -> u8 {
        self.rank.min(10)
    }

    /// A fresh, ordered 52-card deck
    pub fn deck() -> Vec<Card> {
        Suit::ALL
            .iter()
            .flat_map(|&suit| (1..=13).map(move |rank| Card { rank, suit }))
            .collect()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self.rank {
            1 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            n => n.to_string(),
        };
        write!(f, "{}{}", rank, self.suit.symbol())
    }
}

/// An ordered hand of cards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Best blackjack total: one ace counts 11 when that does not bust the hand
    pub fn value(&self) -> u8 {
        let hard: u32 = self.cards.iter().map(|c| u32::from(c.value())).sum();
        let has_ace = self.cards.iter().any(Card::is_ace);
        let best = if has_ace && hard + 10 <= u32::from(BLACKJACK) {
            hard + 10
        } else {
            hard
        };
        best.min(u32::from(u8::MAX)) as u8
    }

    /// True when an ace is currently counted as 11
    pub fn is_soft(&self) -> bool {
        let hard: u32 = self.cards.iter().map(|c| u32::from(c.value())).sum();
        self.cards.iter().any(Card::is_ace) && hard + 10 <= u32::from(BLACKJACK)
    }

    pub fn is_bust(&self) -> bool {
        self.value() > BLACKJACK
    }

    /// Dealer policy: draw below 17, stand on any 17 including soft
    pub fn dealer_must_hit(&self) -> bool {
        self.value() < DEALER_STANDS_ON
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

/// A player decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Hit,
    Stand,
}

impl Decision {
    /// Wire spelling, padded to the field width by the encoder
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Hit => "HIT",
            Decision::Stand => "STAND",
        }
    }

    /// Interpret a decoded decision field. `Hittt` is the legacy spelling of a hit.
    pub fn parse(text: &str) -> Result<Self, GameRuleViolation> {
        let word = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        match word.to_ascii_uppercase().as_str() {
            "HIT" | "HITTT" => Ok(Decision::Hit),
            "STAND" => Ok(Decision::Stand),
            _ => Err(GameRuleViolation::UnknownDecision(text.to_string())),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result field of a server payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoundResult {
    /// Round still running; the payload carries a card
    Continue = 0x0,
    Push = 0x1,
    Lose = 0x2,
    Win = 0x3,
}

impl RoundResult {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(RoundResult::Continue),
            0x1 => Some(RoundResult::Push),
            0x2 => Some(RoundResult::Lose),
            0x3 => Some(RoundResult::Win),
            _ => None,
        }
    }

    pub fn is_final(self) -> bool {
        self != RoundResult::Continue
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RoundResult::Continue => "continue",
            RoundResult::Push => "push",
            RoundResult::Lose => "lose",
            RoundResult::Win => "win",
        };
        f.write_str(text)
    }
}

/// Win/loss/push tally, from the player's point of view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
}

impl Stats {
    pub fn record(&mut self, result: RoundResult) {
        match result {
            RoundResult::Win => self.wins += 1,
            RoundResult::Lose => self.losses += 1,
            RoundResult::Push => self.pushes += 1,
            RoundResult::Continue => {}
        }
    }

    pub fn rounds(&self) -> u32 {
        self.wins + self.losses + self.pushes
    }

    /// Percentage of rounds won, 0 when nothing was played
    pub fn win_rate(&self) -> f64 {
        match self.rounds() {
            0 => 0.0,
            n => f64::from(self.wins) * 100.0 / f64::from(n),
        }
    }
}
