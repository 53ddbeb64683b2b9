//! Blackjack round state machine
//!
//! The table never touches the network. Each transition returns the
//! payloads the client must see, in order, and the engine writes them.
//! Calling a transition from the wrong phase is an error rather than a
//! silent no-op, so a desynchronised driver fails loudly.
//!
//! ```text
//! DealingInitial -> PlayerTurn -> DealerTurn -> RoundResult -> DealingInitial
//!                        |                          ^              | (last round)
//!                        +------- player bust ------+              v
//!                                                             SessionDone
//! ```

use protocol::{Card, Decision, Hand, RoundResult, ServerPayload, Stats};
use thiserror::Error;

use super::shoe::Shoe;

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    PlayerBust,
    DealerBust,
    PlayerHigher,
    DealerHigher,
    Push,
}

impl Outcome {
    /// Wire result from the player's point of view
    pub fn result(self) -> RoundResult {
        match self {
            Outcome::PlayerBust | Outcome::DealerHigher => RoundResult::Lose,
            Outcome::DealerBust | Outcome::PlayerHigher => RoundResult::Win,
            Outcome::Push => RoundResult::Push,
        }
    }
}

/// Compare two finished hands. A player bust loses even if the dealer busts too.
pub fn settle(player: &Hand, dealer: &Hand) -> Outcome {
    if player.is_bust() {
        return Outcome::PlayerBust;
    }
    if dealer.is_bust() {
        return Outcome::DealerBust;
    }
    match player.value().cmp(&dealer.value()) {
        std::cmp::Ordering::Greater => Outcome::PlayerHigher,
        std::cmp::Ordering::Less => Outcome::DealerHigher,
        std::cmp::Ordering::Equal => Outcome::Push,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    DealingInitial,
    PlayerTurn,
    DealerTurn,
    RoundResult(Outcome),
    SessionDone,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("{operation} is not allowed during {phase:?}")]
    OutOfPhase {
        operation: &'static str,
        phase: Phase,
    },

    #[error("Shoe ran out of cards")]
    ShoeExhausted,
}

pub struct Table<S: Shoe> {
    shoe: S,
    phase: Phase,
    player: Hand,
    dealer: Hand,
    rounds: u8,
    played: u8,
    stats: Stats,
}

impl<S: Shoe> Table<S> {
    /// A table for `rounds` rounds. Zero rounds starts in `SessionDone`.
    pub fn new(rounds: u8, shoe: S) -> Self {
        Self {
            shoe,
            phase: if rounds == 0 {
                Phase::SessionDone
            } else {
                Phase::DealingInitial
            },
            player: Hand::new(),
            dealer: Hand::new(),
            rounds,
            played: 0,
            stats: Stats::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self) -> &Hand {
        &self.player
    }

    pub fn dealer(&self) -> &Hand {
        &self.dealer
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// 1-based number of the round in progress (or last played)
    pub fn round(&self) -> u8 {
        (self.played + 1).min(self.rounds)
    }

    pub fn rounds_remaining(&self) -> u8 {
        self.rounds - self.played
    }

    /// DealingInitial -> PlayerTurn: two cards to the player, one face up to the dealer
    pub fn deal_initial(&mut self) -> Result<Vec<ServerPayload>, TableError> {
        self.require("deal_initial", self.phase == Phase::DealingInitial)?;

        self.shoe.reset();
        self.player.clear();
        self.dealer.clear();

        let first = self.draw()?;
        let second = self.draw()?;
        let up = self.draw()?;
        let hole = self.draw()?;

        self.player.push(first);
        self.player.push(second);
        self.dealer.push(up);
        self.dealer.push(hole);

        self.phase = Phase::PlayerTurn;
        Ok(vec![
            ServerPayload::card(first),
            ServerPayload::card(second),
            ServerPayload::card(up),
        ])
    }

    /// PlayerTurn -> PlayerTurn | DealerTurn | RoundResult(PlayerBust)
    pub fn apply_decision(&mut self, decision: Decision) -> Result<Vec<ServerPayload>, TableError> {
        self.require("apply_decision", self.phase == Phase::PlayerTurn)?;

        match decision {
            Decision::Hit => {
                let card = self.draw()?;
                self.player.push(card);
                if self.player.is_bust() {
                    self.phase = Phase::RoundResult(Outcome::PlayerBust);
                }
                Ok(vec![ServerPayload::card(card)])
            }
            Decision::Stand => {
                self.phase = Phase::DealerTurn;
                Ok(Vec::new())
            }
        }
    }

    /// DealerTurn -> RoundResult: reveal the hole card, then draw below 17
    pub fn play_dealer(&mut self) -> Result<Vec<ServerPayload>, TableError> {
        self.require("play_dealer", self.phase == Phase::DealerTurn)?;

        let mut out = Vec::new();
        if let Some(&hole) = self.dealer.cards().get(1) {
            out.push(ServerPayload::card(hole));
        }

        while self.dealer.dealer_must_hit() {
            let card = self.draw()?;
            self.dealer.push(card);
            out.push(ServerPayload::card(card));
        }

        self.phase = Phase::RoundResult(settle(&self.player, &self.dealer));
        Ok(out)
    }

    /// RoundResult -> DealingInitial | SessionDone, recording the outcome
    pub fn finish_round(&mut self) -> Result<(Outcome, ServerPayload), TableError> {
        let Phase::RoundResult(outcome) = self.phase else {
            return Err(TableError::OutOfPhase {
                operation: "finish_round",
                phase: self.phase,
            });
        };

        self.stats.record(outcome.result());
        self.played += 1;
        self.phase = if self.played < self.rounds {
            Phase::DealingInitial
        } else {
            Phase::SessionDone
        };

        Ok((outcome, ServerPayload::outcome(outcome.result())))
    }

    fn require(&self, operation: &'static str, allowed: bool) -> Result<(), TableError> {
        if allowed {
            Ok(())
        } else {
            Err(TableError::OutOfPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn draw(&mut self) -> Result<Card, TableError> {
        self.shoe.draw().ok_or(TableError::ShoeExhausted)
    }
}
