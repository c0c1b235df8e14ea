//! Plain-text views of a session snapshot, one per stage.

use std::fmt::Write as _;

use reading_core::Session;
use shared::{
    catalog,
    domain::{ChatMessage, ChatRole, SpreadKind, Stage},
};

pub const COMMAND_HELP: &str = "명령: /back 뒤로, /category <id> 카테고리, /save 저장, /reset 처음으로, /quit 종료";

pub fn render(session: &Session) -> String {
    match session.stage() {
        Stage::Welcome => welcome(),
        Stage::Question => question(session),
        Stage::Spread => spread_menu(),
        Stage::Shuffle => shuffle(session),
        Stage::Result => result(session),
    }
}

fn welcome() -> String {
    [
        "🔮 AI 타로 리딩",
        "카드가 전하는 메시지에 귀 기울여 보세요.",
        "",
        "Enter 키를 누르면 시작합니다. (/quit 종료)",
    ]
    .join("\n")
}

fn question(session: &Session) -> String {
    let mut out = String::from("어떤 고민이 있으신가요?\n");
    for category in catalog::categories() {
        let marker = if session.category() == Some(category.id) {
            "▶"
        } else {
            " "
        };
        let _ = writeln!(
            out,
            "{marker} {} {} ({})",
            category.icon, category.name, category.id
        );
    }
    out.push_str("\n질문을 입력하세요. 카테고리는 /category <id> 로 고를 수 있습니다. (/back 뒤로)");
    out
}

fn spread_menu() -> String {
    let mut out = String::from("스프레드를 선택하세요.\n");
    for (index, spread) in SpreadKind::ALL.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}) {} ({}장) - {}",
            index + 1,
            spread.name(),
            spread.required_card_count(),
            spread.description()
        );
    }
    out.push_str("\n번호를 입력하세요. (/back 뒤로)");
    out
}

fn shuffle(session: &Session) -> String {
    let mut out = String::from("🃏 카드를 선택하세요\n");
    if let Some(progress) = session.progress() {
        let _ = writeln!(
            out,
            "{}/{} 선택됨 - 다음: {}",
            progress.drawn,
            progress.required,
            progress.label()
        );
    }
    for (position, card) in session.positioned_cards() {
        let _ = writeln!(out, "  {}: {} {}", position.label(), card.glyph, card.name);
    }
    let _ = write!(
        out,
        "\n덱에 {}장이 남아 있습니다. 1-{} 사이의 번호를 입력하세요.",
        session.deck().len(),
        session.deck().len()
    );
    out
}

fn result(session: &Session) -> String {
    let mut out = String::from("✨ 리딩 결과\n");
    let _ = writeln!(out, "질문: {}", session.question());
    for (position, card) in session.positioned_cards() {
        let _ = writeln!(
            out,
            "  [{}] {} {} ({}) - {}",
            position.label(),
            card.glyph,
            card.name,
            card.name_en,
            card.keyword_list()
        );
    }
    out.push('\n');
    if session.interpretation().is_empty() {
        out.push_str("🔮 AI가 카드를 해석하고 있습니다...");
    } else {
        out.push_str(session.interpretation());
    }
    for message in session.chat() {
        out.push_str("\n\n");
        out.push_str(&chat_line(message));
    }
    out.push_str("\n\n추가 질문을 입력하세요. (/save 저장, /reset 새로운 리딩)");
    out
}

pub fn chat_line(message: &ChatMessage) -> String {
    let speaker = match message.role {
        ChatRole::User => "🙋 나",
        ChatRole::Assistant => "🔮 타로",
    };
    format!("{speaker}: {}", message.content)
}

/// Maps a one-based menu number to a spread; the spread's own names are accepted too.
pub fn parse_spread_choice(input: &str) -> Option<SpreadKind> {
    let input = input.trim();
    if let Ok(index) = input.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| SpreadKind::ALL.get(i))
            .copied();
    }
    input.parse::<SpreadKind>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_is_the_initial_view() {
        let view = render(&Session::default());
        assert!(view.starts_with("🔮 AI 타로 리딩"));
    }

    #[test]
    fn spread_choice_accepts_menu_numbers_and_names() {
        assert_eq!(parse_spread_choice("1"), Some(SpreadKind::One));
        assert_eq!(parse_spread_choice(" 2 "), Some(SpreadKind::Three));
        assert_eq!(parse_spread_choice("three"), Some(SpreadKind::Three));
        assert_eq!(parse_spread_choice("0"), None);
        assert_eq!(parse_spread_choice("9"), None);
        assert_eq!(parse_spread_choice("many"), None);
    }

    #[test]
    fn chat_lines_name_the_speaker() {
        assert_eq!(chat_line(&ChatMessage::user("언제?")), "🙋 나: 언제?");
        assert!(chat_line(&ChatMessage::assistant("곧")).starts_with("🔮 타로"));
    }

    #[test]
    fn spread_menu_lists_every_spread() {
        let view = spread_menu();
        for spread in SpreadKind::ALL {
            assert!(view.contains(spread.name()));
        }
    }
}
