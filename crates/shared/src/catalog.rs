use std::collections::HashSet;

use crate::{
    domain::{Card, CardId, Category},
    error::CatalogError,
};

pub const MAJOR_ARCANA_SIZE: usize = 22;
pub const MIN_KEYWORDS: usize = 3;

const fn card(
    id: u8,
    name: &'static str,
    name_en: &'static str,
    keywords: &'static [&'static str],
    glyph: &'static str,
) -> Card {
    Card {
        id: CardId(id),
        name,
        name_en,
        keywords,
        glyph,
    }
}

pub static MAJOR_ARCANA: [Card; MAJOR_ARCANA_SIZE] = [
    card(0, "바보", "The Fool", &["새로운 시작", "순수함", "모험"], "🃏"),
    card(1, "마법사", "The Magician", &["창조", "의지", "기술"], "🎩"),
    card(2, "여사제", "The High Priestess", &["직관", "신비", "무의식"], "🔮"),
    card(3, "여황제", "The Empress", &["풍요", "양육", "창조성"], "👑"),
    card(4, "황제", "The Emperor", &["권위", "구조", "안정"], "⚜️"),
    card(5, "교황", "The Hierophant", &["전통", "지혜", "영적 지도"], "📿"),
    card(6, "연인", "The Lovers", &["사랑", "선택", "조화"], "💕"),
    card(7, "전차", "The Chariot", &["승리", "의지", "전진"], "🏇"),
    card(8, "힘", "Strength", &["용기", "인내", "자제력"], "🦁"),
    card(9, "은둔자", "The Hermit", &["성찰", "고독", "내면의 지혜"], "🕯️"),
    card(10, "운명의 수레바퀴", "Wheel of Fortune", &["변화", "운명", "순환"], "🎡"),
    card(11, "정의", "Justice", &["공정", "진실", "균형"], "⚖️"),
    card(12, "매달린 사람", "The Hanged Man", &["희생", "새로운 관점", "정체"], "🙃"),
    card(13, "죽음", "Death", &["변화", "종결", "재탄생"], "💀"),
    card(14, "절제", "Temperance", &["균형", "조화", "인내"], "🧘"),
    card(15, "악마", "The Devil", &["속박", "유혹", "물질"], "😈"),
    card(16, "탑", "The Tower", &["파괴", "계시", "해방"], "🗼"),
    card(17, "별", "The Star", &["희망", "영감", "치유"], "⭐"),
    card(18, "달", "The Moon", &["환상", "불안", "무의식"], "🌙"),
    card(19, "태양", "The Sun", &["성공", "기쁨", "긍정"], "☀️"),
    card(20, "심판", "Judgement", &["깨달음", "재생", "결정"], "📯"),
    card(21, "세계", "The World", &["완성", "성취", "통합"], "🌍"),
];

pub static CATEGORIES: [Category; 5] = [
    Category {
        id: "love",
        name: "연애/관계",
        icon: "💕",
        color_token: "pink",
    },
    Category {
        id: "career",
        name: "직업/진로",
        icon: "💼",
        color_token: "blue",
    },
    Category {
        id: "money",
        name: "재물/금전",
        icon: "💰",
        color_token: "yellow",
    },
    Category {
        id: "health",
        name: "건강",
        icon: "🏥",
        color_token: "green",
    },
    Category {
        id: "general",
        name: "일반 운세",
        icon: "🎯",
        color_token: "purple",
    },
];

pub fn categories() -> &'static [Category] {
    &CATEGORIES
}

pub fn category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.id == id)
}

/// A validated set of cards. Every card handed out by a catalog has a unique id
/// inside the major arcana range, a non-empty name and at least [`MIN_KEYWORDS`] keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardCatalog {
    cards: Vec<Card>,
}

impl CardCatalog {
    pub fn major_arcana() -> Result<Self, CatalogError> {
        let catalog = Self::from_cards(MAJOR_ARCANA.to_vec())?;
        if catalog.len() != MAJOR_ARCANA_SIZE {
            return Err(CatalogError::WrongCardCount {
                expected: MAJOR_ARCANA_SIZE,
                actual: catalog.len(),
            });
        }
        Ok(catalog)
    }

    pub fn from_cards(cards: Vec<Card>) -> Result<Self, CatalogError> {
        if cards.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if usize::from(card.id.0) >= MAJOR_ARCANA_SIZE {
                return Err(CatalogError::IdOutOfRange(card.id));
            }
            if !seen.insert(card.id) {
                return Err(CatalogError::DuplicateId(card.id));
            }
            if card.name.trim().is_empty() || card.name_en.trim().is_empty() {
                return Err(CatalogError::EmptyName(card.id));
            }
            if card.keywords.len() < MIN_KEYWORDS {
                return Err(CatalogError::TooFewKeywords {
                    id: card.id,
                    required: MIN_KEYWORDS,
                    actual: card.keywords.len(),
                });
            }
        }

        Ok(Self { cards })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
