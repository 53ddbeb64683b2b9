//! Dealer-side game logic

pub mod engine;
pub mod shoe;
pub mod table;

pub use engine::{GameEngine, SessionReport};
pub use shoe::{Shoe, ShuffledShoe, StackedShoe};
pub use table::{Outcome, Phase, Table, TableError, settle};
