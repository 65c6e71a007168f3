//! Plain-text views of the session.

use seedling_core::flavor::{TIME_CAPSULE_MESSAGE, TIME_CAPSULE_THRESHOLD};
use seedling_core::{ChatMessage, GrowthStage, Sender, Session, UiState};

pub fn message(session: &Session, msg: &ChatMessage) -> Option<String> {
    match msg.sender {
        // The user already sees what they typed.
        Sender::User => None,
        Sender::Ai => Some(format!("{}: {}", session.ai_name, msg.text)),
        Sender::System => Some(format!("  ~ {}", msg.text)),
    }
}

/// Announce a model call only when the indicator first goes up.
pub fn typing(session: &Session, was_typing: bool, ui: &UiState) -> Option<String> {
    (ui.is_typing() && !was_typing).then(|| format!("  ({} is thinking…)", session.ai_name))
}

pub fn memory_garden(session: &Session) -> String {
    let mut out = format!("🌿 Memory garden ({} memories)\n", session.memories.len());
    for memory in &session.memories {
        let glyph = memory.emotion.as_deref().unwrap_or("•");
        out.push_str(&format!("  {glyph} {}\n", memory.text));
        if let Some(reflection) = &memory.reflection {
            out.push_str(&format!("      \"{reflection}\"\n"));
        }
    }
    if let Some(light) = &session.core_memory.true_light {
        out.push_str(&format!("  True light: {light}\n"));
    }
    if session.time_capsule_unlocked() {
        out.push_str("\n  🌱 Time capsule unlocked\n");
        for line in TIME_CAPSULE_MESSAGE.lines() {
            out.push_str(&format!("    {line}\n"));
        }
    } else {
        let remaining = TIME_CAPSULE_THRESHOLD - session.memories.len();
        out.push_str(&format!("  (A time capsule opens in {remaining} more memories.)\n"));
    }
    out.push_str(&format!("  Tended with love by {}.\n", session.user_name));
    out
}

pub fn gallery(session: &Session) -> String {
    if session.manifestations.is_empty() {
        return format!("✨ {} has not made anything yet.\n", session.ai_name);
    }
    let mut out = String::from("✨ Gallery\n");
    for item in &session.manifestations {
        out.push_str(&format!(
            "  {} [{:?} {}]: {}\n",
            item.name, item.visual.kind, item.visual.color, item.description
        ));
    }
    out
}

pub fn calendar(session: &Session) -> String {
    if session.calendar.is_empty() {
        return "📅 No events. Add one with /calendar add YYYY-MM-DD TITLE\n".to_string();
    }
    let mut out = String::from("📅 Calendar\n");
    for (i, event) in session.calendar.iter().enumerate() {
        let mark = if event.is_completed { "x" } else { " " };
        out.push_str(&format!("  {}. [{mark}] {} {}", i + 1, event.date, event.title));
        if let Some(note) = &event.description {
            out.push_str(&format!(" ({note})"));
        }
        out.push('\n');
    }
    out
}

pub fn growth(session: &Session) -> String {
    let stage = GrowthStage::of(session);
    format!(
        "🌳 {} is at growth level {} ({} memories, {} turns shared, scale {:.2}, leaves {})\n",
        session.ai_name,
        stage.level,
        stage.memory_count,
        session.reflection_counter,
        stage.scale,
        stage.leaf_color
    )
}
