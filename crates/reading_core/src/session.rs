//! The single mutable aggregate of a reading. All draw invariants are enforced here.

use serde::Serialize;
use shared::domain::{Card, CardId, ChatMessage, Position, SpreadKind, Stage};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    stage: Stage,
    question: String,
    category: Option<&'static str>,
    spread: Option<SpreadKind>,
    deck: Vec<Card>,
    drawn: Vec<Card>,
    interpretation: String,
    chat: Vec<ChatMessage>,
    busy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawProgress {
    pub drawn: usize,
    pub required: usize,
    /// Position the next drawn card will occupy; `None` once the spread is full.
    pub next: Option<Position>,
}

impl DrawProgress {
    pub fn label(&self) -> &'static str {
        self.next.map(Position::label).unwrap_or("완료")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrawError {
    NoSpread,
    Full,
    NotInDeck,
}

impl Session {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn category(&self) -> Option<&'static str> {
        self.category
    }

    pub fn spread(&self) -> Option<SpreadKind> {
        self.spread
    }

    /// Cards still available to draw, in shuffled order.
    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn drawn(&self) -> &[Card] {
        &self.drawn
    }

    pub fn interpretation(&self) -> &str {
        &self.interpretation
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn required_card_count(&self) -> Option<usize> {
        self.spread.map(SpreadKind::required_card_count)
    }

    pub fn is_draw_complete(&self) -> bool {
        self.required_card_count()
            .is_some_and(|required| self.drawn.len() == required)
    }

    pub fn progress(&self) -> Option<DrawProgress> {
        let spread = self.spread?;
        Some(DrawProgress {
            drawn: self.drawn.len(),
            required: spread.required_card_count(),
            next: spread.positions().get(self.drawn.len()).copied(),
        })
    }

    /// Drawn cards paired with the spread position each one landed in.
    pub fn positioned_cards(&self) -> Vec<(Position, Card)> {
        let Some(spread) = self.spread else {
            return Vec::new();
        };
        spread
            .positions()
            .iter()
            .copied()
            .zip(self.drawn.iter().copied())
            .collect()
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub(crate) fn set_question(&mut self, question: String) {
        self.question = question;
    }

    pub(crate) fn set_category(&mut self, category: &'static str) {
        self.category = Some(category);
    }

    /// Installs a freshly shuffled deck for `spread` and forgets any earlier draw.
    pub(crate) fn begin_draw(&mut self, spread: SpreadKind, deck: Vec<Card>) {
        self.spread = Some(spread);
        self.deck = deck;
        self.drawn.clear();
    }

    /// Moves `card_id` from the deck into the drawn sequence.
    pub(crate) fn draw(&mut self, card_id: CardId) -> Result<Card, DrawError> {
        let required = self.required_card_count().ok_or(DrawError::NoSpread)?;
        if self.drawn.len() >= required {
            return Err(DrawError::Full);
        }
        let index = self
            .deck
            .iter()
            .position(|card| card.id == card_id)
            .ok_or(DrawError::NotInDeck)?;
        let card = self.deck.remove(index);
        self.drawn.push(card);
        Ok(card)
    }

    pub(crate) fn set_interpretation(&mut self, interpretation: String) {
        self.interpretation = interpretation;
    }

    pub(crate) fn push_chat(&mut self, message: ChatMessage) {
        self.chat.push(message);
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }
}
