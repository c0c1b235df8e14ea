use std::sync::Arc;

use shared::{domain::Card, protocol::FollowUpRequest};
use tracing::{info, warn};

use crate::{
    backend::{BackendError, ReadingBackend, FOLLOW_UP_PATH},
    interpretation::Provenance,
};

pub const FOLLOW_UP_APOLOGY: &str =
    "죄송합니다. 지금은 해석 서버와 연결되지 않아 기본 답변을 드릴게요.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpAnswer {
    pub text: String,
    pub provenance: Provenance,
}

pub struct FollowUpService {
    backend: Arc<dyn ReadingBackend>,
}

impl FollowUpService {
    pub fn new(backend: Arc<dyn ReadingBackend>) -> Self {
        Self { backend }
    }

    pub async fn answer(&self, question: &str, cards: &[Card]) -> FollowUpAnswer {
        let request = FollowUpRequest::new(question, cards);
        let remote = self
            .backend
            .follow_up(&request)
            .await
            .and_then(|response| {
                let text = response.response.trim().to_string();
                if text.is_empty() {
                    Err(BackendError::Malformed {
                        endpoint: FOLLOW_UP_PATH.to_string(),
                        reason: "empty response".to_string(),
                    })
                } else {
                    Ok(text)
                }
            });

        match remote {
            Ok(text) => {
                info!(cards = cards.len(), "remote follow-up answer received");
                FollowUpAnswer {
                    text,
                    provenance: Provenance::Remote,
                }
            }
            Err(err) => {
                warn!(error = %err, "follow-up backend failed; using local template");
                FollowUpAnswer {
                    text: format!("{FOLLOW_UP_APOLOGY}\n\n{}", local_follow_up(question, cards)),
                    provenance: Provenance::LocalFallback,
                }
            }
        }
    }
}

pub fn local_follow_up(question: &str, cards: &[Card]) -> String {
    let names: Vec<&str> = cards.iter().map(|card| card.name).collect();
    format!(
        "{question}에 대해 답변드리자면, 앞서 뽑으신 카드들이 보여주는 메시지를 좀 더 구체적으로 설명해드릴게요.\n\n선택된 카드 {}는 서로 조화를 이루며 당신의 상황을 말해주고 있습니다. 카드가 전하는 메시지를 마음 깊이 받아들이시고, 작은 실천부터 시작해보세요. 🌟",
        names.join(", ")
    )
}
