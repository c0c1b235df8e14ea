//! Stage state machine driving a [`Session`] from welcome to result.
//!
//! Intents take `&self`; the session sits behind a mutex that is released while a
//! remote call is in flight. Each reset bumps an epoch, and results issued under an
//! older epoch are dropped instead of being applied to the fresh session.

use std::{fmt, sync::Arc};

use shared::{
    catalog::{self, CardCatalog},
    domain::{CardId, ChatMessage, SpreadKind, Stage},
    error::CatalogError,
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::{
    backend::ReadingBackend,
    follow_up::FollowUpService,
    interpretation::{InterpretationService, Provenance},
    session::{DrawError, Session},
    shuffle::{RandomShuffler, Shuffler},
};

pub const SAVE_ACKNOWLEDGEMENT: &str = "결과가 저장되었습니다! (데모 버전)";

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("invalid card catalog: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    WrongStage(Stage),
    Busy,
    BlankQuestion,
    UnknownCategory,
    DrawComplete,
    CardNotInDeck,
    BlankFollowUp,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::WrongStage(stage) => write!(f, "not available in {stage} stage"),
            Rejection::Busy => f.write_str("a reading is still being generated"),
            Rejection::BlankQuestion => f.write_str("question is blank"),
            Rejection::UnknownCategory => f.write_str("unknown category"),
            Rejection::DrawComplete => f.write_str("all cards for this spread are drawn"),
            Rejection::CardNotInDeck => f.write_str("card is not in the deck"),
            Rejection::BlankFollowUp => f.write_str("follow-up question is blank"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    Applied,
    Ignored(Rejection),
}

impl IntentOutcome {
    pub fn is_applied(self) -> bool {
        self == IntentOutcome::Applied
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StageChanged { from: Stage, to: Stage },
    InterpretationReady { provenance: Provenance },
    ChatAppended(ChatMessage),
    Reset,
}

struct ControllerState {
    session: Session,
    epoch: u64,
}

pub struct StageController {
    catalog: CardCatalog,
    shuffler: Arc<dyn Shuffler>,
    interpreter: InterpretationService,
    follow_up: FollowUpService,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<SessionEvent>,
}

impl StageController {
    pub fn new(backend: Arc<dyn ReadingBackend>) -> Result<Arc<Self>, ControllerError> {
        Self::new_with_shuffler(backend, Arc::new(RandomShuffler))
    }

    /// Validates the card table once; a bad table never reaches the templates.
    pub fn new_with_shuffler(
        backend: Arc<dyn ReadingBackend>,
        shuffler: Arc<dyn Shuffler>,
    ) -> Result<Arc<Self>, ControllerError> {
        let catalog = CardCatalog::major_arcana()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Arc::new(Self {
            catalog,
            shuffler,
            interpreter: InterpretationService::new(backend.clone()),
            follow_up: FollowUpService::new(backend),
            inner: Mutex::new(ControllerState {
                session: Session::default(),
                epoch: 0,
            }),
            events,
        }))
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Read-only copy of the current session for rendering.
    pub async fn snapshot(&self) -> Session {
        self.inner.lock().await.session.clone()
    }

    pub async fn start(&self) -> IntentOutcome {
        let mut guard = self.inner.lock().await;
        if let Err(rejection) = ready(&guard.session, &[Stage::Welcome]) {
            return ignored("start", rejection);
        }
        self.transition(&mut guard, Stage::Question);
        IntentOutcome::Applied
    }

    pub async fn back(&self) -> IntentOutcome {
        let mut guard = self.inner.lock().await;
        if let Err(rejection) = ready(&guard.session, &[Stage::Question, Stage::Spread]) {
            return ignored("back", rejection);
        }
        let to = match guard.session.stage() {
            Stage::Spread => Stage::Question,
            _ => Stage::Welcome,
        };
        self.transition(&mut guard, to);
        IntentOutcome::Applied
    }

    pub async fn select_category(&self, category_id: &str) -> IntentOutcome {
        let mut guard = self.inner.lock().await;
        if let Err(rejection) = ready(&guard.session, &[Stage::Question]) {
            return ignored("select_category", rejection);
        }
        let Some(category) = catalog::category(category_id) else {
            return ignored("select_category", Rejection::UnknownCategory);
        };
        guard.session.set_category(category.id);
        debug!(category = category.id, "category selected");
        IntentOutcome::Applied
    }

    /// Records the question and moves on to spread selection. Blank input changes nothing.
    pub async fn next(&self, question: &str) -> IntentOutcome {
        let mut guard = self.inner.lock().await;
        if let Err(rejection) = ready(&guard.session, &[Stage::Question]) {
            return ignored("next", rejection);
        }
        let question = question.trim();
        if question.is_empty() {
            return ignored("next", Rejection::BlankQuestion);
        }
        guard.session.set_question(question.to_string());
        self.transition(&mut guard, Stage::Spread);
        IntentOutcome::Applied
    }

    pub async fn select_spread(&self, spread: SpreadKind) -> IntentOutcome {
        let mut guard = self.inner.lock().await;
        if let Err(rejection) = ready(&guard.session, &[Stage::Spread]) {
            return ignored("select_spread", rejection);
        }
        let deck = self.shuffler.shuffle(self.catalog.cards());
        guard.session.begin_draw(spread, deck);
        info!(spread = spread.as_str(), "deck shuffled");
        self.transition(&mut guard, Stage::Shuffle);
        IntentOutcome::Applied
    }

    /// Draws one card. The draw that fills the spread moves the session to
    /// [`Stage::Result`] and runs the interpretation exactly once; the result stage
    /// refuses further draws, so the transition cannot fire again.
    pub async fn select_card(&self, card_id: CardId) -> IntentOutcome {
        let (epoch, question, cards, spread) = {
            let mut guard = self.inner.lock().await;
            if let Err(rejection) = ready(&guard.session, &[Stage::Shuffle]) {
                return ignored("select_card", rejection);
            }
            match guard.session.draw(card_id) {
                Ok(card) => debug!(card_id = card.id.0, card = card.name, "card drawn"),
                Err(DrawError::Full) => return ignored("select_card", Rejection::DrawComplete),
                Err(DrawError::NotInDeck) => {
                    return ignored("select_card", Rejection::CardNotInDeck)
                }
                Err(DrawError::NoSpread) => {
                    return ignored("select_card", Rejection::WrongStage(Stage::Shuffle))
                }
            }
            if !guard.session.is_draw_complete() {
                return IntentOutcome::Applied;
            }
            let Some(spread) = guard.session.spread() else {
                return IntentOutcome::Applied;
            };

            self.transition(&mut guard, Stage::Result);
            guard.session.set_busy(true);
            (
                guard.epoch,
                guard.session.question().to_string(),
                guard.session.drawn().to_vec(),
                spread,
            )
        };

        let interpretation = self.interpreter.interpret(&question, &cards, spread).await;

        let mut guard = self.inner.lock().await;
        if guard.epoch != epoch {
            info!(issued_epoch = epoch, current_epoch = guard.epoch, "dropping stale interpretation");
            return IntentOutcome::Applied;
        }
        guard.session.set_interpretation(interpretation.text);
        guard.session.set_busy(false);
        let _ = self.events.send(SessionEvent::InterpretationReady {
            provenance: interpretation.provenance,
        });
        IntentOutcome::Applied
    }

    /// Appends the user's question to the chat immediately and the answer once it
    /// arrives. The busy flag covers the whole exchange, failures included.
    pub async fn submit_follow_up(&self, text: &str) -> IntentOutcome {
        let (epoch, question, cards) = {
            let mut guard = self.inner.lock().await;
            if let Err(rejection) = ready(&guard.session, &[Stage::Result]) {
                return ignored("submit_follow_up", rejection);
            }
            if text.trim().is_empty() {
                return ignored("submit_follow_up", Rejection::BlankFollowUp);
            }
            let message = ChatMessage::user(text);
            guard.session.push_chat(message.clone());
            guard.session.set_busy(true);
            let _ = self.events.send(SessionEvent::ChatAppended(message));
            (guard.epoch, text.to_string(), guard.session.drawn().to_vec())
        };

        let answer = self.follow_up.answer(&question, &cards).await;

        let mut guard = self.inner.lock().await;
        if guard.epoch != epoch {
            info!(issued_epoch = epoch, current_epoch = guard.epoch, "dropping stale follow-up answer");
            return IntentOutcome::Applied;
        }
        let message = ChatMessage::assistant(answer.text);
        guard.session.push_chat(message.clone());
        guard.session.set_busy(false);
        let _ = self.events.send(SessionEvent::ChatAppended(message));
        IntentOutcome::Applied
    }

    /// Acknowledges a save request. Nothing is persisted.
    pub async fn save(&self) -> IntentOutcome {
        let guard = self.inner.lock().await;
        if let Err(rejection) = ready(&guard.session, &[Stage::Result]) {
            return ignored("save", rejection);
        }
        info!("save requested; readings are not persisted");
        IntentOutcome::Applied
    }

    /// Returns every session field to its default, from any stage, and invalidates
    /// in-flight calls.
    pub async fn reset(&self) -> IntentOutcome {
        let mut guard = self.inner.lock().await;
        let from = guard.session.stage();
        guard.epoch += 1;
        guard.session = Session::default();
        info!(from = %from, epoch = guard.epoch, "session reset");
        let _ = self.events.send(SessionEvent::Reset);
        IntentOutcome::Applied
    }

    fn transition(&self, state: &mut ControllerState, to: Stage) {
        let from = state.session.stage();
        state.session.set_stage(to);
        info!(from = %from, to = %to, epoch = state.epoch, "stage transition");
        let _ = self.events.send(SessionEvent::StageChanged { from, to });
    }
}

fn ready(session: &Session, stages: &[Stage]) -> Result<(), Rejection> {
    if session.is_busy() {
        return Err(Rejection::Busy);
    }
    if !stages.contains(&session.stage()) {
        return Err(Rejection::WrongStage(session.stage()));
    }
    Ok(())
}

fn ignored(intent: &'static str, rejection: Rejection) -> IntentOutcome {
    debug!(intent, %rejection, "intent ignored");
    IntentOutcome::Ignored(rejection)
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
