//! Drives a [`Table`] over one client connection

use std::time::Duration;

use protocol::{ClientPayload, Decision, MessageStream, ServerPayload, Stats};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use super::shoe::Shoe;
use super::table::{Phase, Table};
use crate::error::SessionError;

/// What a finished session leaves behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub client_name: String,
    pub rounds: u8,
    pub stats: Stats,
}

pub struct GameEngine<S, H: Shoe> {
    stream: MessageStream<S>,
    table: Table<H>,
    client_name: String,
    rounds: u8,
    decision_timeout: Duration,
}

impl<S, H> GameEngine<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: Shoe,
{
    pub fn new(
        stream: MessageStream<S>,
        client_name: String,
        rounds: u8,
        shoe: H,
        decision_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            table: Table::new(rounds, shoe),
            client_name,
            rounds,
            decision_timeout,
        }
    }

    /// Play every requested round, then close the connection
    pub async fn run(mut self) -> Result<SessionReport, SessionError> {
        loop {
            match self.table.phase() {
                Phase::DealingInitial => {
                    debug!("Dealing round {}/{}", self.table.round(), self.rounds);
                    let payloads = self.table.deal_initial()?;
                    self.send_all(&payloads).await?;
                }
                Phase::PlayerTurn => {
                    let decision = self.read_decision().await?;
                    debug!("{} chose {} on {}", self.client_name, decision, self.table.player().value());
                    let payloads = self.table.apply_decision(decision)?;
                    self.send_all(&payloads).await?;
                }
                Phase::DealerTurn => {
                    let payloads = self.table.play_dealer()?;
                    self.send_all(&payloads).await?;
                }
                Phase::RoundResult(_) => {
                    let round = self.table.round();
                    let player = self.table.player().value();
                    let dealer = self.table.dealer().value();
                    let (outcome, payload) = self.table.finish_round()?;
                    self.stream.write_message(&payload).await?;
                    info!(
                        "Round {}/{} for {}: {} ({:?}, player {} vs dealer {})",
                        round,
                        self.rounds,
                        self.client_name,
                        payload.result,
                        outcome,
                        player,
                        dealer
                    );
                }
                Phase::SessionDone => break,
            }
        }

        if let Err(e) = self.stream.shutdown().await {
            debug!("Shutdown after session with {} failed: {}", self.client_name, e);
        }

        Ok(SessionReport {
            client_name: self.client_name,
            rounds: self.rounds,
            stats: self.table.stats(),
        })
    }

    async fn read_decision(&mut self) -> Result<Decision, SessionError> {
        let payload: ClientPayload = self.stream.read_message_within(self.decision_timeout).await?;
        Ok(payload.decision()?)
    }

    async fn send_all(&mut self, payloads: &[ServerPayload]) -> Result<(), SessionError> {
        for payload in payloads {
            self.stream.write_message(payload).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::shoe::StackedShoe;
    use protocol::{Card, GameRuleViolation, Message, RoundResult, Suit, TransportError};
    use tokio::io::{AsyncWriteExt, DuplexStream, duplex};

    const IO: Duration = Duration::from_secs(1);

    fn shoe(ranks: &[u8]) -> StackedShoe {
        StackedShoe::new(ranks.iter().map(|&r| Card::new(r, Suit::Clubs).unwrap()))
    }

    fn start(rounds: u8, ranks: &[u8], decision_timeout: Duration) -> (
        tokio::task::JoinHandle<Result<SessionReport, SessionError>>,
        MessageStream<DuplexStream>,
    ) {
        let (server, client) = duplex(1024);
        let engine = GameEngine::new(
            MessageStream::new(server, IO),
            "tester".to_string(),
            rounds,
            shoe(ranks),
            decision_timeout,
        );
        (tokio::spawn(engine.run()), MessageStream::new(client, IO))
    }

    async fn recv(client: &mut MessageStream<DuplexStream>) -> ServerPayload {
        client.read_message().await.unwrap()
    }

    async fn send(client: &mut MessageStream<DuplexStream>, decision: Decision) {
        client.write_message(&ClientPayload::new(decision)).await.unwrap();
    }

    #[tokio::test]
    async fn test_stand_then_dealer_plays() {
        // player 10,9; dealer 10,6 draws 3 -> 19 push
        let (task, mut client) = start(1, &[10, 9, 10, 6, 3], IO);

        let ranks: Vec<u16> = [
            recv(&mut client).await,
            recv(&mut client).await,
            recv(&mut client).await,
        ]
        .iter()
        .map(|p| p.rank)
        .collect();
        assert_eq!(ranks, vec![10, 9, 10]);

        send(&mut client, Decision::Stand).await;
        assert_eq!(recv(&mut client).await.rank, 6);
        assert_eq!(recv(&mut client).await.rank, 3);
        assert_eq!(recv(&mut client).await, ServerPayload::outcome(RoundResult::Push));

        let mut buf = [0u8; 1];
        assert!(matches!(
            protocol::read_exactly(&mut client.into_inner(), &mut buf, IO).await,
            Err(TransportError::ConnectionClosed)
        ));

        let report = task.await.unwrap().unwrap();
        assert_eq!(report.rounds, 1);
        assert_eq!(report.stats.pushes, 1);
    }

    #[tokio::test]
    async fn test_bust_ends_round_without_dealer_cards() {
        let (task, mut client) = start(1, &[10, 6, 7, 9, 9], IO);
        for _ in 0..3 {
            recv(&mut client).await;
        }

        send(&mut client, Decision::Hit).await;
        assert_eq!(recv(&mut client).await.rank, 9);
        assert_eq!(recv(&mut client).await, ServerPayload::outcome(RoundResult::Lose));

        let report = task.await.unwrap().unwrap();
        assert_eq!(report.stats.losses, 1);
    }

    #[tokio::test]
    async fn test_legacy_hit_spelling_is_accepted() {
        let (task, mut client) = start(1, &[2, 3, 10, 8, 4], IO);
        for _ in 0..3 {
            recv(&mut client).await;
        }

        let legacy = ClientPayload {
            decision: "Hittt".to_string(),
        };
        client.write_message(&legacy).await.unwrap();
        assert_eq!(recv(&mut client).await.rank, 4);

        send(&mut client, Decision::Stand).await;
        // hole card, then an outcome
        assert_eq!(recv(&mut client).await.rank, 8);
        assert_eq!(recv(&mut client).await, ServerPayload::outcome(RoundResult::Lose));
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_unknown_decision_ends_session() {
        let (task, mut client) = start(1, &[10, 9, 10, 6], IO);
        for _ in 0..3 {
            recv(&mut client).await;
        }

        let bogus = ClientPayload {
            decision: "FOLD".to_string(),
        };
        client.write_message(&bogus).await.unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Rule(GameRuleViolation::UnknownDecision(ref d)) if d == "FOLD"
        ));
    }

    #[tokio::test]
    async fn test_client_leaving_mid_round_is_a_disconnect() {
        let (task, mut client) = start(3, &[10, 9, 10, 6], IO);
        recv(&mut client).await;
        drop(client);

        let err = task.await.unwrap().unwrap_err();
        assert!(err.is_disconnect());
    }

    #[tokio::test]
    async fn test_decision_timeout() {
        let (task, mut client) = start(1, &[10, 9, 10, 6], Duration::from_millis(50));
        for _ in 0..3 {
            recv(&mut client).await;
        }

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, SessionError::Transport(TransportError::Timeout(_))));
        drop(client);
    }

    #[tokio::test]
    async fn test_garbage_decision_is_a_protocol_error() {
        let (task, mut client) = start(1, &[10, 9, 10, 6], IO);
        for _ in 0..3 {
            recv(&mut client).await;
        }

        let mut raw = ClientPayload::new(Decision::Stand).to_bytes();
        raw[0] ^= 0xFF;
        let mut inner = client.into_inner();
        inner.write_all(&raw).await.unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, SessionError::Protocol(_)));
    }
}
