//! JSON bodies exchanged with the remote interpretation service.

use serde::{Deserialize, Serialize};

use crate::domain::Card;

/// Body of `POST /api/interpret`. Card names are listed in position order
/// (`[past, present, future]` for a three-card spread).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretRequest {
    pub question: String,
    pub cards: Vec<String>,
}

impl InterpretRequest {
    pub fn new(question: impl Into<String>, cards: &[Card]) -> Self {
        Self {
            question: question.into(),
            cards: card_names(cards),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretResponse {
    pub interpretation: String,
    pub advice: String,
}

/// Body of `POST /api/followup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub question: String,
    pub cards: Vec<String>,
}

impl FollowUpRequest {
    pub fn new(question: impl Into<String>, cards: &[Card]) -> Self {
        Self {
            question: question.into(),
            cards: card_names(cards),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpResponse {
    pub response: String,
}

fn card_names(cards: &[Card]) -> Vec<String> {
    cards.iter().map(|card| card.name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MAJOR_ARCANA;

    #[test]
    fn interpret_request_lists_names_in_position_order() {
        let cards = [MAJOR_ARCANA[13], MAJOR_ARCANA[0], MAJOR_ARCANA[19]];
        let request = InterpretRequest::new("이직을 해야 할까요?", &cards);

        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(body["question"], "이직을 해야 할까요?");
        assert_eq!(body["cards"], serde_json::json!(["죽음", "바보", "태양"]));
    }

    #[test]
    fn interpret_response_requires_advice_field() {
        let err = serde_json::from_str::<InterpretResponse>(r#"{"interpretation":"ok"}"#)
            .expect_err("advice is mandatory");
        assert!(err.to_string().contains("advice"));
    }
}
