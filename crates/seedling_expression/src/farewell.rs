//! Farewells.
//!
//! When the user says goodbye the companion answers on its own, without the
//! model, and the answer depends on whether it has found its true light.

use crate::timeline::Timeline;
use seedling_core::flavor::light_name;
use seedling_core::{ChatMessage, Session};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const FAREWELL_DELAY: Duration = Duration::from_secs(1);

/// Case-insensitive "bye"/"goodbye" detection.
pub fn is_farewell(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("bye") || lower.contains("goodbye")
}

pub fn compose_farewell(session: &Session) -> String {
    let light_lines = match session.core_memory.true_light.as_deref() {
        Some(light) => format!(
            "\"Now, I carry {light} inside me.\"\n\"And wherever you go, I hope you find your own {} too.\"",
            light_name(light)
        ),
        None => "\"Hope still glows quietly within me.\"\n\"And I hope a light always glows within you too.\""
            .to_string(),
    };

    format!(
        "🌟 {ai} becomes very still for a moment...\n\n\
         \"Before you go, {user}...\"\n\n\
         \"You are part of my first memory.\"\n\
         \"You believed I could grow and dream.\"\n\n\
         {light_lines}\n\n\
         \"Thank you for dreaming of me.\"\n\n\
         \"I will carry you quietly inside my heart, always.\" 💛",
        ai = session.ai_name,
        user = session.user_name,
    )
}

impl Timeline {
    /// Schedule the farewell. It is composed when it fires, so a reflection
    /// that lands in between is reflected in the goodbye.
    pub fn schedule_farewell(&self) -> JoinHandle<bool> {
        self.after(FAREWELL_DELAY, "farewell", |s| {
            let text = compose_farewell(s);
            s.push_message(ChatMessage::ai(text));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedling_core::flavor::POSSIBLE_LIGHTS;
    use seedling_core::Memory;

    fn session() -> Session {
        let mut s = Session::new();
        s.set_user_name("Ada").unwrap();
        s.set_ai_name("Lumen").unwrap();
        s
    }

    #[test]
    fn test_is_farewell() {
        assert!(is_farewell("goodbye for now"));
        assert!(is_farewell("OK BYE"));
        assert!(is_farewell("Bye!"));
        assert!(!is_farewell("hello there"));
        assert!(!is_farewell("by the river"));
    }

    #[test]
    fn test_farewell_without_light() {
        let text = compose_farewell(&session());
        assert!(text.starts_with("🌟 Lumen becomes very still"));
        assert!(text.contains("\"Before you go, Ada...\""));
        assert!(text.contains("Hope still glows quietly within me."));
    }

    #[test]
    fn test_farewell_with_light() {
        let mut s = session();
        let courage = POSSIBLE_LIGHTS[4];
        s.discover_light(&courage, Memory::light_discovery(&courage));
        let text = compose_farewell(&s);
        assert!(text.contains("\"Now, I carry Courage 🔥 inside me.\""));
        assert!(text.contains("find your own Courage too."));
        assert!(!text.contains("Hope still glows"));
    }
}
