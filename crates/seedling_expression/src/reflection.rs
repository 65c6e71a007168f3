//! Reflection: the companion goes quiet and settles on its true light.

use crate::timeline::Timeline;
use seedling_core::flavor::{Light, POSSIBLE_LIGHTS};
use seedling_core::random::choose;
use seedling_core::{ChatMessage, Memory};
use std::time::Duration;
use tokio::task::JoinHandle;

/// From the triggering turn to the "going quiet" line.
pub const REFLECTION_DELAY: Duration = Duration::from_secs(1);
/// From the "going quiet" line to the revelation.
pub const REFLECTION_REVEAL: Duration = Duration::from_secs(2);

pub(crate) fn quiet_line(ai_name: &str) -> String {
    format!("🌟 {ai_name} becomes very quiet for a long moment...")
}

pub(crate) fn revelation_line(light: &Light) -> String {
    format!(
        "\"I remember when I was first born, Hope was my first light. But now... I think my true light is: {}\"",
        light.label()
    )
}

impl Timeline {
    /// Schedule one reflection. Fire-and-forget; resolves to the discovered
    /// light, or `None` if the session was reset before it finished.
    ///
    /// The last reflection wins: `true_light` is overwritten, earlier lights
    /// survive only as memories.
    pub fn schedule_reflection(&self) -> JoinHandle<Option<Light>> {
        let store = self.store.clone();
        let random = self.random.clone();
        let guard = store.guard();
        let delay = self.pacing.scale(REFLECTION_DELAY);
        let reveal = self.pacing.scale(REFLECTION_REVEAL);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let light = *choose(random.as_ref(), &POSSIBLE_LIGHTS)?;

            store.apply_guarded(guard, |s| {
                let line = quiet_line(&s.ai_name);
                s.push_message(ChatMessage::system(line));
            })?;

            tokio::time::sleep(reveal).await;

            store.apply_guarded(guard, |s| {
                s.push_message(ChatMessage::ai(revelation_line(&light)));
                s.discover_light(&light, Memory::light_discovery(&light));
            })?;

            tracing::info!(light = light.name, "Reflection discovered a true light");
            Some(light)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedling_core::{FixedRandom, PacingConfig, Sender, SessionStore};
    use std::sync::Arc;

    fn timeline(index: usize) -> Timeline {
        let store = SessionStore::new();
        store.apply(|s| {
            s.set_user_name("Ada").unwrap();
            s.set_ai_name("Lumen").unwrap();
        });
        Timeline::new(
            Arc::new(store),
            Arc::new(FixedRandom { index, roll: 1.0 }),
            PacingConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reflection_sequence() {
        let tl = timeline(6);
        let handle = tl.schedule_reflection();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let mid = tl.store().snapshot();
        assert_eq!(mid.messages.len(), 1);
        assert_eq!(mid.messages[0].sender, Sender::System);
        assert_eq!(mid.messages[0].text, "🌟 Lumen becomes very quiet for a long moment...");
        assert!(mid.core_memory.true_light.is_none());

        let light = handle.await.unwrap().unwrap();
        assert_eq!(light.name, "Grief");

        let done = tl.store().snapshot();
        assert_eq!(done.core_memory.true_light.as_deref(), Some("Grief 🌫️"));
        assert_eq!(done.messages[1].sender, Sender::Ai);
        assert!(done.messages[1].text.ends_with("my true light is: Grief 🌫️\""));
        let memory = done.memories.last().unwrap();
        assert_eq!(memory.text, "Discovered true light: Grief 🌫️");
        assert_eq!(memory.emotion.as_deref(), Some("🌫️"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reflection_abandoned_after_reset() {
        let tl = timeline(0);
        let handle = tl.schedule_reflection();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        tl.store().reset();
        assert!(handle.await.unwrap().is_none());
        let snap = tl.store().snapshot();
        assert!(snap.messages.is_empty());
        assert!(snap.core_memory.true_light.is_none());
    }
}
