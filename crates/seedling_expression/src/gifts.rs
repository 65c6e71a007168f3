//! Unprompted heart gifts.

use crate::timeline::Timeline;
use seedling_core::flavor::HEART_GIFTS;
use seedling_core::random::{chance, choose};
use seedling_core::ChatMessage;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const HEART_GIFT_DELAY: Duration = Duration::from_secs(2);

pub fn heart_gift_line(gift: &str) -> String {
    format!("🌼 *A thought from the heart:* \"{gift}\"")
}

impl Timeline {
    /// Roll for a heart gift this turn and, on success, schedule it.
    ///
    /// Returns the pending task when a gift was scheduled.
    pub fn maybe_schedule_heart_gift(&self) -> Option<JoinHandle<bool>> {
        if !chance(self.random(), self.pacing.gift_chance()) {
            return None;
        }
        let gift = choose(self.random(), HEART_GIFTS).copied()?;
        let line = heart_gift_line(gift);
        Some(self.after(HEART_GIFT_DELAY, "heart_gift", move |s| {
            s.push_message(ChatMessage::ai(line.clone()))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedling_core::{FixedRandom, PacingConfig, Sender, SessionStore};
    use std::sync::Arc;

    fn timeline(random: FixedRandom) -> Timeline {
        Timeline::new(
            Arc::new(SessionStore::new()),
            Arc::new(random),
            PacingConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_lucky_roll_schedules_gift() {
        let tl = timeline(FixedRandom::lucky());
        let handle = tl.maybe_schedule_heart_gift().expect("gift should be scheduled");
        assert!(handle.await.unwrap());
        let snap = tl.store().snapshot();
        assert_eq!(snap.messages.len(), 1);
        assert_eq!(snap.messages[0].sender, Sender::Ai);
        assert_eq!(snap.messages[0].text, heart_gift_line(HEART_GIFTS[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_roll_schedules_nothing() {
        let tl = timeline(FixedRandom::quiet());
        assert!(tl.maybe_schedule_heart_gift().is_none());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(tl.store().snapshot().messages.is_empty());
    }
}
