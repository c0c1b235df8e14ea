use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u8);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One major arcana card. Records live in a static table and are copied around by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: &'static str,
    pub name_en: &'static str,
    pub keywords: &'static [&'static str],
    pub glyph: &'static str,
}

impl Card {
    /// Keyword at `index`, or an empty string when the record is shorter.
    ///
    /// Catalog validation guarantees at least three keywords, so indices 0..3 always hit.
    pub fn keyword(&self, index: usize) -> &'static str {
        self.keywords.get(index).copied().unwrap_or_default()
    }

    pub fn keyword_list(&self) -> String {
        self.keywords.join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color_token: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Today,
    Past,
    Present,
    Future,
}

impl Position {
    pub fn key(self) -> &'static str {
        match self {
            Position::Today => "today",
            Position::Past => "past",
            Position::Present => "present",
            Position::Future => "future",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Today => "오늘의 카드",
            Position::Past => "과거",
            Position::Present => "현재",
            Position::Future => "미래",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadKind {
    One,
    Three,
}

impl SpreadKind {
    pub const ALL: [SpreadKind; 2] = [SpreadKind::One, SpreadKind::Three];

    pub fn required_card_count(self) -> usize {
        self.positions().len()
    }

    pub fn positions(self) -> &'static [Position] {
        match self {
            SpreadKind::One => &[Position::Today],
            SpreadKind::Three => &[Position::Past, Position::Present, Position::Future],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpreadKind::One => "one",
            SpreadKind::Three => "three",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpreadKind::One => "원 카드",
            SpreadKind::Three => "쓰리 카드",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SpreadKind::One => "오늘의 메시지",
            SpreadKind::Three => "과거-현재-미래",
        }
    }
}

impl FromStr for SpreadKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "one" | "1" => Ok(SpreadKind::One),
            "three" | "3" => Ok(SpreadKind::Three),
            other => Err(format!("unknown spread '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Welcome,
    Question,
    Spread,
    Shuffle,
    Result,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Welcome => "welcome",
            Stage::Question => "question",
            Stage::Spread => "spread",
            Stage::Shuffle => "shuffle",
            Stage::Result => "result",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
