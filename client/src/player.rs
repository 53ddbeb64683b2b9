//! Who makes the player's decisions

use std::future::Future;
use std::io::{self, Write};

use protocol::{Card, Decision, GameRuleViolation, Hand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

pub trait DecisionMaker {
    /// Hit or stand, given the player's hand and the dealer's up-card
    fn decide(&mut self, player: &Hand, dealer_up: Card) -> impl Future<Output = io::Result<Decision>>;
}

/// Hits below a fixed total, like the dealer does
#[derive(Debug, Clone, Copy)]
pub struct Auto {
    stand_on: u8,
}

impl Auto {
    pub fn new(stand_on: u8) -> Self {
        Self { stand_on }
    }
}

impl DecisionMaker for Auto {
    async fn decide(&mut self, player: &Hand, _dealer_up: Card) -> io::Result<Decision> {
        Ok(if player.value() < self.stand_on {
            Decision::Hit
        } else {
            Decision::Stand
        })
    }
}

/// Asks a human on the terminal
pub struct Interactive<R> {
    lines: Lines<R>,
}

impl Interactive<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Interactive<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines() }
    }

    /// Ask how many rounds to play. `None` means the user chose to quit.
    pub async fn ask_rounds(&mut self) -> io::Result<Option<u8>> {
        loop {
            let answer = self.prompt("How many rounds do you want to play? (1-255, q to quit): ").await?;
            if answer.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match answer.parse::<u32>() {
                Ok(n) => match validate_rounds(n) {
                    Ok(rounds) => return Ok(Some(rounds)),
                    Err(e) => println!("{}", e),
                },
                Err(_) => println!("Please enter a number."),
            }
        }
    }

    async fn prompt(&mut self, text: &str) -> io::Result<String> {
        print!("{}", text);
        io::stdout().flush()?;
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed")),
        }
    }
}

impl<R: AsyncBufRead + Unpin> DecisionMaker for Interactive<R> {
    async fn decide(&mut self, _player: &Hand, _dealer_up: Card) -> io::Result<Decision> {
        loop {
            let answer = self.prompt("Hit or stand? [h/s]: ").await?;
            match parse_choice(&answer) {
                Some(decision) => return Ok(decision),
                None => println!("Please enter 'h' to hit or 's' to stand."),
            }
        }
    }
}

/// Keyboard shorthand for a decision
pub fn parse_choice(input: &str) -> Option<Decision> {
    match input.trim().to_ascii_lowercase().as_str() {
        "h" | "hit" => Some(Decision::Hit),
        "s" | "stand" => Some(Decision::Stand),
        _ => None,
    }
}

/// Round counts must fit the one-byte field and be non-zero
pub fn validate_rounds(n: u32) -> Result<u8, GameRuleViolation> {
    match u8::try_from(n) {
        Ok(0) => Err(GameRuleViolation::ZeroRounds),
        Ok(rounds) => Ok(rounds),
        Err(_) => Err(GameRuleViolation::RoundsOutOfRange(n)),
    }
}
