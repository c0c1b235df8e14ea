use std::sync::Arc;

use serde::Serialize;
use shared::{
    domain::{Card, CardId, SpreadKind},
    protocol::{InterpretRequest, InterpretResponse},
};
use tracing::{info, warn};

use crate::backend::{BackendError, ReadingBackend, INTERPRET_PATH};

/// Appended to every locally generated reading so the user knows where it came from.
pub const FALLBACK_NOTICE: &str =
    "⚠️ 로컬 해석 모드: 해석 서버에 연결할 수 없어 기본 해석을 보여드립니다.";

const ADVICE_LABEL: &str = "✨ 오늘의 조언";
const DIVIDER: &str = "━━━━━━━━━━━━━━━━";

/// Future cards that close a three-card reading on a hopeful note.
const POSITIVE_FUTURE_IDS: [CardId; 3] = [CardId(19), CardId(17), CardId(21)];
/// Future cards that announce upheaval.
const TRANSFORMATIVE_FUTURE_IDS: [CardId; 2] = [CardId(13), CardId(16)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Remote,
    LocalFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub text: String,
    pub provenance: Provenance,
}

pub struct InterpretationService {
    backend: Arc<dyn ReadingBackend>,
}

impl InterpretationService {
    pub fn new(backend: Arc<dyn ReadingBackend>) -> Self {
        Self { backend }
    }

    /// Always yields a reading. Any backend failure, including a blank payload,
    /// falls back to the local templates with [`FALLBACK_NOTICE`] attached.
    pub async fn interpret(
        &self,
        question: &str,
        cards: &[Card],
        spread: SpreadKind,
    ) -> Interpretation {
        let request = InterpretRequest::new(question, cards);
        let remote = self
            .backend
            .interpret(&request)
            .await
            .and_then(require_interpretation);

        match remote {
            Ok(response) => {
                info!(spread = spread.as_str(), cards = cards.len(), "remote interpretation received");
                Interpretation {
                    text: compose_remote(&response),
                    provenance: Provenance::Remote,
                }
            }
            Err(err) => {
                warn!(error = %err, spread = spread.as_str(), "interpretation backend failed; using local templates");
                Interpretation {
                    text: format!("{}\n\n{FALLBACK_NOTICE}", local_reading(spread, question, cards)),
                    provenance: Provenance::LocalFallback,
                }
            }
        }
    }
}

fn require_interpretation(response: InterpretResponse) -> Result<InterpretResponse, BackendError> {
    if response.interpretation.trim().is_empty() {
        return Err(BackendError::Malformed {
            endpoint: INTERPRET_PATH.to_string(),
            reason: "empty interpretation".to_string(),
        });
    }
    Ok(response)
}

fn compose_remote(response: &InterpretResponse) -> String {
    let interpretation = response.interpretation.trim();
    let advice = response.advice.trim();
    if advice.is_empty() {
        interpretation.to_string()
    } else {
        format!("{interpretation}\n\n{ADVICE_LABEL}: {advice}")
    }
}

/// Deterministic reading built from the card table alone.
pub fn local_reading(spread: SpreadKind, question: &str, cards: &[Card]) -> String {
    match (spread, cards) {
        (SpreadKind::One, [card, ..]) => one_card_reading(card, question),
        (SpreadKind::Three, [past, present, future, ..]) => {
            three_card_reading(past, present, future, question)
        }
        _ => {
            let names: Vec<&str> = cards.iter().map(|card| card.name).collect();
            format!(
                "당신의 질문 \"{question}\"에 대해 {} 카드가 나왔습니다.",
                names.join(", ")
            )
        }
    }
}

fn bespoke_message(id: CardId) -> Option<&'static str> {
    match id.0 {
        0 => Some("새로운 시작의 에너지가 가득합니다. 두려워하지 말고 용기있게 첫 걸음을 내디뎌보세요. 완벽하지 않아도 괜찮습니다. 지금이 바로 변화의 시점입니다."),
        6 => Some("중요한 선택의 순간입니다. 당신의 마음이 이끄는 방향을 따르세요. 진정한 사랑과 조화는 마음의 소리에 귀 기울일 때 찾아옵니다."),
        10 => Some("인생의 큰 전환점이 다가오고 있습니다. 변화를 두려워하지 마세요. 우주의 흐름에 몸을 맡기면 좋은 기회가 찾아올 것입니다."),
        19 => Some("매우 긍정적인 신호입니다! 당신이 걱정하던 일들이 좋은 방향으로 해결될 것입니다. 자신감을 가지고 밝은 미래를 향해 나아가세요."),
        _ => None,
    }
}

fn one_card_reading(card: &Card, question: &str) -> String {
    let body = match bespoke_message(card.id) {
        Some(message) => message.to_string(),
        None => format!(
            "{}의 에너지가 강하게 나타나고 있습니다. 이 카드는 당신에게 {}에 집중할 것을 권유합니다. 지금은 {}가 필요한 시기입니다.",
            card.keyword(0),
            card.keyword(1),
            card.keyword(2)
        ),
    };

    format!(
        "🔮 {} ({})\n\n핵심 키워드: {}\n\n당신의 질문 \"{question}\"에 대해 {} 카드가 나왔습니다.\n\n{body}\n\n{ADVICE_LABEL}: 작은 변화라도 시작해보세요. 당신의 직관을 믿으세요.",
        card.name,
        card.name_en,
        card.keyword_list(),
        card.name,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FutureOutlook {
    Positive,
    Transformative,
    Open,
}

fn future_outlook(id: CardId) -> FutureOutlook {
    if POSITIVE_FUTURE_IDS.contains(&id) {
        FutureOutlook::Positive
    } else if TRANSFORMATIVE_FUTURE_IDS.contains(&id) {
        FutureOutlook::Transformative
    } else {
        FutureOutlook::Open
    }
}

fn three_card_reading(past: &Card, present: &Card, future: &Card, question: &str) -> String {
    let closing = match future_outlook(future.id) {
        FutureOutlook::Positive => format!(
            "매우 긍정적인 미래가 보입니다! {}의 에너지가 당신을 기다리고 있습니다. 현재의 노력이 결실을 맺을 것입니다.",
            future.keyword(0)
        ),
        FutureOutlook::Transformative => "큰 변화가 예상됩니다. 두려워 보일 수 있지만, 이는 새로운 시작을 위한 과정입니다. 변화를 받아들이는 용기가 필요합니다.".to_string(),
        FutureOutlook::Open => format!(
            "{}의 가능성이 보입니다. 지금의 선택이 미래를 결정할 것입니다.",
            future.keyword(0)
        ),
    };

    let mut text = format!("🔮 쓰리 카드 리딩\n\n질문: {question}\n\n{DIVIDER}\n\n");

    text.push_str(&format!(
        "🕰️ 과거 ({})\n{}\n\n과거에 {}의 경험을 하셨군요. 이것이 현재 상황의 배경이 되고 있습니다.\n\n",
        past.name,
        past.keyword_list(),
        past.keyword(0)
    ));
    text.push_str(&format!(
        "⏰ 현재 ({})\n{}\n\n지금 당신은 {}의 에너지 속에 있습니다. {}이/가 중요한 시기입니다.\n\n",
        present.name,
        present.keyword_list(),
        present.keyword(0),
        present.keyword(1)
    ));
    text.push_str(&format!(
        "🌅 미래 ({})\n{}\n\n{closing}",
        future.name,
        future.keyword_list()
    ));
    text.push_str(&format!(
        "\n\n{DIVIDER}\n\n💫 종합 조언\n\n과거의 {}에서 벗어나, 현재 {}에 집중하세요. 그러면 미래의 {}이 당신을 기다리고 있을 것입니다. 우주는 항상 당신을 응원합니다.",
        past.keyword(0),
        present.keyword(0),
        future.keyword(0)
    ));

    text
}

#[cfg(test)]
#[path = "tests/interpretation_tests.rs"]
mod tests;
