use rand::seq::SliceRandom;
use shared::domain::Card;

/// Produces the deck a user draws from. Implementations must return a permutation
/// of the input: every card exactly once.
pub trait Shuffler: Send + Sync {
    fn shuffle(&self, cards: &[Card]) -> Vec<Card>;
}

/// Uniform Fisher-Yates shuffle over the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomShuffler;

impl Shuffler for RandomShuffler {
    fn shuffle(&self, cards: &[Card]) -> Vec<Card> {
        let mut deck = cards.to_vec();
        deck.shuffle(&mut rand::rng());
        deck
    }
}
