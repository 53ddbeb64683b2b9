//! Blackjack LAN client
//!
//! Finds a server through its broadcast offers, requests a number of rounds
//! and plays them, either interactively or with a fixed strategy.

pub mod config;
pub mod discovery;
pub mod error;
pub mod output;
pub mod player;
pub mod session;

pub use config::Config;
pub use discovery::{DiscoveredServer, DiscoveryError, OfferListener};
pub use error::SessionError;
pub use output::TerminalPresenter;
pub use player::{Auto, DecisionMaker, Interactive};
pub use session::{ClientSession, TableEvent, TableView};
