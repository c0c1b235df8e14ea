use thiserror::Error;

use crate::domain::CardId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("card catalog is empty")]
    Empty,
    #[error("expected {expected} cards, got {actual}")]
    WrongCardCount { expected: usize, actual: usize },
    #[error("card id {0} is outside the major arcana range")]
    IdOutOfRange(CardId),
    #[error("card id {0} appears more than once")]
    DuplicateId(CardId),
    #[error("card {0} has an empty name")]
    EmptyName(CardId),
    #[error("card {id} has {actual} keywords, at least {required} are required")]
    TooFewKeywords {
        id: CardId,
        required: usize,
        actual: usize,
    },
}
