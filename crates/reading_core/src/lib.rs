//! Session core of the tarot reader: the stage state machine, the deck shuffler and
//! the interpretation services that talk to the remote reading backend.

pub mod backend;
pub mod controller;
pub mod follow_up;
pub mod interpretation;
pub mod session;
pub mod shuffle;

pub use backend::{BackendError, HttpReadingBackend, MissingReadingBackend, ReadingBackend};
pub use controller::{
    ControllerError, IntentOutcome, Rejection, SessionEvent, StageController, SAVE_ACKNOWLEDGEMENT,
};
pub use follow_up::{FollowUpAnswer, FollowUpService};
pub use interpretation::{Interpretation, InterpretationService, Provenance, FALLBACK_NOTICE};
pub use session::{DrawProgress, Session};
pub use shuffle::{RandomShuffler, Shuffler};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
