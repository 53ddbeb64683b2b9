//! Card sources

use protocol::Card;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Where the table draws cards from
pub trait Shoe: Send {
    /// Next card, or `None` when the shoe is empty
    fn draw(&mut self) -> Option<Card>;

    /// Called before every round
    fn reset(&mut self);
}

/// A single 52-card deck, reshuffled before every round
pub struct ShuffledShoe {
    rng: StdRng,
    cards: Vec<Card>,
}

impl ShuffledShoe {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut shoe = Self {
            rng,
            cards: Vec::with_capacity(52),
        };
        shoe.reset();
        shoe
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

impl Shoe for ShuffledShoe {
    fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    fn reset(&mut self) {
        self.cards = Card::deck();
        self.cards.shuffle(&mut self.rng);
    }
}

/// Deals a fixed sequence of cards in order. Reset does not refill it.
#[derive(Debug, Clone, Default)]
pub struct StackedShoe {
    cards: VecDeque<Card>,
}

impl StackedShoe {
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }
}

impl Shoe for StackedShoe {
    fn draw(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Suit;
    use std::collections::HashSet;

    #[test]
    fn test_shuffled_shoe_deals_a_full_deck() {
        let mut shoe = ShuffledShoe::seeded(7);
        let mut seen = HashSet::new();
        while let Some(card) = shoe.draw() {
            assert!(seen.insert(card));
        }
        assert_eq!(seen.len(), 52);

        shoe.reset();
        assert_eq!(shoe.remaining(), 52);
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut a = ShuffledShoe::seeded(99);
        let mut b = ShuffledShoe::seeded(99);
        for _ in 0..52 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn test_stacked_shoe_keeps_order() {
        let ace = Card::new(1, Suit::Hearts).unwrap();
        let king = Card::new(13, Suit::Spades).unwrap();
        let mut shoe = StackedShoe::new([ace, king]);
        shoe.reset();
        assert_eq!(shoe.draw(), Some(ace));
        assert_eq!(shoe.draw(), Some(king));
        assert_eq!(shoe.draw(), None);
    }
}
