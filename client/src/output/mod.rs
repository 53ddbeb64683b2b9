//! Output and display management

use crossterm::style::{Color, Stylize, style};
use protocol::{Card, RoundResult, Stats};

use crate::discovery::DiscoveredServer;
use crate::session::{TableEvent, TableView};

const RULE_WIDTH: usize = 50;

/// Prints the game to the terminal
pub struct TerminalPresenter {
    use_colors: bool,
}

impl TerminalPresenter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn welcome(&self, name: &str) {
        let rule = "═".repeat(RULE_WIDTH);
        println!("{}", self.paint(&rule, Color::Cyan));
        println!("{}", self.bold("BLACKJACK CLIENT", Color::Yellow));
        println!("{}", self.paint(&format!("Team: {}", name), Color::Green));
        println!("{}", self.paint(&rule, Color::Cyan));
    }

    pub fn listening(&self, port: u16) {
        self.line(&format!("Client started, listening for offer requests on UDP port {}...", port), Color::Cyan);
    }

    pub fn offer(&self, server: &DiscoveredServer) {
        self.line(
            &format!("Received offer from '{}' at {}", server.name, server.addr.ip()),
            Color::Green,
        );
    }

    pub fn connecting(&self, server: &DiscoveredServer) {
        self.line(&format!("Connecting to {} at {}...", server.name, server.addr), Color::Cyan);
    }

    pub fn summary(&self, rounds: u8, stats: &Stats) {
        let rule = "═".repeat(RULE_WIDTH);
        println!();
        println!("{}", self.paint(&rule, Color::Cyan));
        println!(
            "{} | {} | {}",
            self.paint(&format!("Wins: {}", stats.wins), Color::Green),
            self.paint(&format!("Losses: {}", stats.losses), Color::Red),
            self.paint(&format!("Pushes: {}", stats.pushes), Color::Yellow),
        );
        println!(
            "{}",
            self.bold(
                &format!("Finished playing {} rounds, win rate: {:.1}%", rounds, stats.win_rate()),
                Color::White
            )
        );
        println!("{}", self.paint(&rule, Color::Cyan));
    }

    /// Timestamped status line
    fn line(&self, text: &str, color: Color) {
        println!(
            "[{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            self.paint(text, color)
        );
    }

    fn card(&self, card: Card) -> String {
        let color = if card.suit().is_red() { Color::Red } else { Color::White };
        self.bold(&card.to_string(), color)
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            style(text).with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            style(text).with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl TableView for TerminalPresenter {
    fn show(&mut self, event: &TableEvent) {
        match *event {
            TableEvent::RoundStarted { round, rounds } => {
                println!();
                println!("{}", self.bold(&format!("Round {}/{}", round, rounds), Color::Magenta));
            }
            TableEvent::PlayerCard { card, total } => {
                println!("You received: {} (total {})", self.card(card), total);
            }
            TableEvent::DealerUpCard { card } => {
                println!("Dealer shows: {}", self.card(card));
            }
            TableEvent::DecisionRequested { total } => {
                println!("{}", self.paint(&format!("Your total is {}", total), Color::Cyan));
            }
            TableEvent::PlayerDecided { decision } => {
                println!("{}", self.paint(&format!("You {}", decision.as_str().to_lowercase()), Color::DarkGrey));
            }
            TableEvent::PlayerBust { total } => {
                println!("{}", self.bold(&format!("Bust with {}!", total), Color::Red));
            }
            TableEvent::DealerReveals { card, total } => {
                println!("Dealer reveals: {} (total {})", self.card(card), total);
            }
            TableEvent::DealerHits { card, total } => {
                println!("Dealer hits: {} (total {})", self.card(card), total);
            }
            TableEvent::RoundFinished {
                result,
                player_total,
                dealer_total,
                dealer_bust,
                ..
            } => {
                let (text, color) = match result {
                    RoundResult::Win if dealer_bust => ("Dealer busted, you win!", Color::Green),
                    RoundResult::Win => ("You win!", Color::Green),
                    RoundResult::Lose => ("Dealer wins.", Color::Red),
                    RoundResult::Push => ("Push.", Color::Yellow),
                    RoundResult::Continue => ("Round unfinished.", Color::DarkGrey),
                };
                println!("You {} vs dealer {}: {}", player_total, dealer_total, self.bold(text, color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Suit;

    #[test]
    fn test_plain_output_has_no_escapes() {
        let presenter = TerminalPresenter::new(false);
        let ace = Card::new(1, Suit::Hearts).unwrap();
        assert_eq!(presenter.card(ace), "A♥");
        assert_eq!(presenter.paint("x", Color::Red), "x");
    }

    #[test]
    fn test_colored_output_keeps_text() {
        let presenter = TerminalPresenter::new(true);
        assert!(presenter.bold("Round 1/3", Color::Magenta).contains("Round 1/3"));
    }
}
