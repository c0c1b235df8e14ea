//! Helpers shared by the crate's test suites.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::Router;
use shared::{
    catalog::MAJOR_ARCANA,
    domain::{Card, CardId},
    protocol::{FollowUpRequest, FollowUpResponse, InterpretRequest, InterpretResponse},
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    backend::{BackendError, ReadingBackend},
    shuffle::Shuffler,
};

pub async fn spawn_backend(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// Base url of a port nobody listens on.
pub async fn refused_backend_url() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

pub fn card(id: u8) -> Card {
    MAJOR_ARCANA[usize::from(id)]
}

/// Keeps the catalog order so tests can draw by known position.
pub struct IdentityShuffler;

impl Shuffler for IdentityShuffler {
    fn shuffle(&self, cards: &[Card]) -> Vec<Card> {
        cards.to_vec()
    }
}

/// Moves the given ids to the front of the deck, in order.
pub struct FrontLoadedShuffler(pub Vec<CardId>);

impl Shuffler for FrontLoadedShuffler {
    fn shuffle(&self, cards: &[Card]) -> Vec<Card> {
        let mut deck: Vec<Card> = self
            .0
            .iter()
            .filter_map(|id| cards.iter().find(|card| card.id == *id).copied())
            .collect();
        deck.extend(cards.iter().filter(|card| !self.0.contains(&card.id)).copied());
        deck
    }
}

#[derive(Clone, Copy)]
pub enum Behavior {
    Succeed,
    Fail,
}

/// In-process backend that records requests and can be held open with a gate.
pub struct ScriptedBackend {
    behavior: Behavior,
    delay: Option<Duration>,
    gate: Option<Arc<tokio::sync::Notify>>,
    pub interpret_calls: AtomicUsize,
    pub follow_up_calls: AtomicUsize,
    pub interpret_requests: Mutex<Vec<InterpretRequest>>,
    pub follow_up_requests: Mutex<Vec<FollowUpRequest>>,
}

impl ScriptedBackend {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            delay: None,
            gate: None,
            interpret_calls: AtomicUsize::new(0),
            follow_up_calls: AtomicUsize::new(0),
            interpret_requests: Mutex::new(Vec::new()),
            follow_up_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_gate(mut self, gate: Arc<tokio::sync::Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn interpret_count(&self) -> usize {
        self.interpret_calls.load(Ordering::SeqCst)
    }

    pub fn follow_up_count(&self) -> usize {
        self.follow_up_calls.load(Ordering::SeqCst)
    }

    async fn hold(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ReadingBackend for ScriptedBackend {
    async fn interpret(
        &self,
        request: &InterpretRequest,
    ) -> Result<InterpretResponse, BackendError> {
        self.interpret_calls.fetch_add(1, Ordering::SeqCst);
        self.interpret_requests.lock().await.push(request.clone());
        self.hold().await;
        match self.behavior {
            Behavior::Succeed => Ok(InterpretResponse {
                interpretation: format!("remote reading for {}", request.cards.join("/")),
                advice: "remote advice".to_string(),
            }),
            Behavior::Fail => Err(BackendError::Unavailable),
        }
    }

    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpResponse, BackendError> {
        self.follow_up_calls.fetch_add(1, Ordering::SeqCst);
        self.follow_up_requests.lock().await.push(request.clone());
        self.hold().await;
        match self.behavior {
            Behavior::Succeed => Ok(FollowUpResponse {
                response: format!("remote answer to {}", request.question),
            }),
            Behavior::Fail => Err(BackendError::Unavailable),
        }
    }

    async fn health(&self) -> bool {
        matches!(self.behavior, Behavior::Succeed)
    }
}
