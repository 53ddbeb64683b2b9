//! Client side of a game session
//!
//! The client keeps its own copy of both hands and follows the round purely
//! from message order: three cards, then one card per hit, then the dealer's
//! cards after a stand, and always exactly one outcome to close the round.
//! Anything that does not fit is a desync and ends the session.

use std::net::SocketAddr;
use std::time::Duration;

use protocol::{
    Card, ClientPayload, Decision, GameRuleViolation, Hand, MessageStream, Request, RoundResult,
    ServerPayload, Stats,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::player::DecisionMaker;

/// Something worth showing the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    RoundStarted { round: u8, rounds: u8 },
    PlayerCard { card: Card, total: u8 },
    DealerUpCard { card: Card },
    /// The player's turn is waiting on a decision
    DecisionRequested { total: u8 },
    PlayerDecided { decision: Decision },
    PlayerBust { total: u8 },
    DealerReveals { card: Card, total: u8 },
    DealerHits { card: Card, total: u8 },
    RoundFinished {
        round: u8,
        result: RoundResult,
        player_total: u8,
        dealer_total: u8,
        dealer_bust: bool,
    },
}

/// Receives table events as they happen
pub trait TableView {
    fn show(&mut self, event: &TableEvent);
}

impl TableView for Vec<TableEvent> {
    fn show(&mut self, event: &TableEvent) {
        self.push(event.clone());
    }
}

pub struct ClientSession<S> {
    stream: MessageStream<S>,
    rounds: u8,
}

impl ClientSession<TcpStream> {
    /// Connect, then send the request
    pub async fn connect(
        addr: SocketAddr,
        connect_timeout: Duration,
        read_timeout: Duration,
        rounds: u8,
        name: &str,
    ) -> Result<Self, SessionError> {
        if rounds == 0 {
            return Err(GameRuleViolation::ZeroRounds.into());
        }

        let socket = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| SessionError::ConnectTimeout {
                addr,
                limit: connect_timeout,
            })?
            .map_err(|source| SessionError::Connect { addr, source })?;

        if let Err(e) = socket.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", e);
        }

        Self::start(socket, read_timeout, rounds, name).await
    }
}

impl<S> ClientSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Send the request over an already open connection
    pub async fn start(socket: S, read_timeout: Duration, rounds: u8, name: &str) -> Result<Self, SessionError> {
        if rounds == 0 {
            return Err(GameRuleViolation::ZeroRounds.into());
        }

        let mut stream = MessageStream::new(socket, read_timeout);
        stream.write_message(&Request::new(rounds, name)).await?;
        debug!("Requested {} rounds as {}", rounds, name);

        Ok(Self { stream, rounds })
    }

    pub fn rounds(&self) -> u8 {
        self.rounds
    }

    /// Play every round, then close the connection
    pub async fn play<D, V>(mut self, decider: &mut D, view: &mut V) -> Result<Stats, SessionError>
    where
        D: DecisionMaker,
        V: TableView,
    {
        let mut stats = Stats::default();
        for round in 1..=self.rounds {
            view.show(&TableEvent::RoundStarted {
                round,
                rounds: self.rounds,
            });
            let result = self.play_round(round, decider, view).await?;
            stats.record(result);
        }

        if let Err(e) = self.stream.shutdown().await {
            debug!("Shutdown after session failed: {}", e);
        }
        Ok(stats)
    }

    async fn play_round<D, V>(&mut self, round: u8, decider: &mut D, view: &mut V) -> Result<RoundResult, SessionError>
    where
        D: DecisionMaker,
        V: TableView,
    {
        let mut player = Hand::new();
        let mut dealer = Hand::new();

        for _ in 0..2 {
            let card = self.expect_card("an initial player card").await?;
            player.push(card);
            view.show(&TableEvent::PlayerCard {
                card,
                total: player.value(),
            });
        }
        let up = self.expect_card("the dealer's up-card").await?;
        dealer.push(up);
        view.show(&TableEvent::DealerUpCard { card: up });

        // player turn
        loop {
            view.show(&TableEvent::DecisionRequested { total: player.value() });
            let decision = decider.decide(&player, up).await.map_err(SessionError::Input)?;
            self.stream.write_message(&ClientPayload::new(decision)).await?;
            view.show(&TableEvent::PlayerDecided { decision });

            if decision == Decision::Stand {
                break;
            }

            let card = self.expect_card("a card after hitting").await?;
            player.push(card);
            view.show(&TableEvent::PlayerCard {
                card,
                total: player.value(),
            });

            if player.is_bust() {
                view.show(&TableEvent::PlayerBust {
                    total: player.value(),
                });
                let result = self.expect_outcome().await?;
                return Ok(self.finish(round, result, &player, &dealer, view));
            }
        }

        // dealer turn: hole card, draws, then the outcome
        loop {
            let payload: ServerPayload = self.stream.read_message().await?;
            if payload.result.is_final() {
                let result = outcome_of(payload)?;
                return Ok(self.finish(round, result, &player, &dealer, view));
            }

            let card = card_of(payload, "a dealer card")?;
            dealer.push(card);
            let total = dealer.value();
            if dealer.len() == 2 {
                view.show(&TableEvent::DealerReveals { card, total });
            } else {
                view.show(&TableEvent::DealerHits { card, total });
            }
        }
    }

    fn finish<V: TableView>(
        &self,
        round: u8,
        result: RoundResult,
        player: &Hand,
        dealer: &Hand,
        view: &mut V,
    ) -> RoundResult {
        let expected = expected_result(player, dealer);
        if expected != result {
            warn!(
                "Server reported {} but hands say {} (player {}, dealer {})",
                result,
                expected,
                player.value(),
                dealer.value()
            );
        }

        view.show(&TableEvent::RoundFinished {
            round,
            result,
            player_total: player.value(),
            dealer_total: dealer.value(),
            dealer_bust: dealer.is_bust(),
        });
        result
    }

    async fn expect_card(&mut self, expected: &'static str) -> Result<Card, SessionError> {
        let payload: ServerPayload = self.stream.read_message().await?;
        card_of(payload, expected)
    }

    async fn expect_outcome(&mut self) -> Result<RoundResult, SessionError> {
        let payload: ServerPayload = self.stream.read_message().await?;
        outcome_of(payload)
    }
}

fn card_of(payload: ServerPayload, expected: &'static str) -> Result<Card, SessionError> {
    match payload.to_card() {
        Some(card) if !payload.result.is_final() => Ok(card),
        _ => Err(SessionError::Desync {
            expected,
            got: payload,
        }),
    }
}

fn outcome_of(payload: ServerPayload) -> Result<RoundResult, SessionError> {
    if payload.result.is_final() && payload.rank == 0 {
        Ok(payload.result)
    } else {
        Err(SessionError::Desync {
            expected: "a round outcome",
            got: payload,
        })
    }
}

/// What the server should report for these hands. Only the cards the client
/// saw count, so a bust before the reveal compares against the up-card alone.
fn expected_result(player: &Hand, dealer: &Hand) -> RoundResult {
    if player.is_bust() {
        RoundResult::Lose
    } else if dealer.is_bust() {
        RoundResult::Win
    } else {
        match player.value().cmp(&dealer.value()) {
            std::cmp::Ordering::Greater => RoundResult::Win,
            std::cmp::Ordering::Less => RoundResult::Lose,
            std::cmp::Ordering::Equal => RoundResult::Push,
        }
    }
}
