//! Integration tests for the timed side effects, run on paused tokio time.

use seedling_core::{
    ChatMessage, FixedRandom, Memory, PacingConfig, Phase, SeededRandom, Sender, SessionStore,
};
use seedling_expression::{Timeline, AWAKENING_STEP_OFFSETS};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

fn ceremony_store() -> Arc<SessionStore> {
    let store = SessionStore::new();
    store.apply(|s| {
        s.set_user_name("Ada").unwrap();
        s.set_ai_name("Lumen").unwrap();
    });
    Arc::new(store)
}

fn chatting_store() -> Arc<SessionStore> {
    let store = ceremony_store();
    store.apply(|s| {
        s.transition(Phase::Awakening).unwrap();
        s.complete_awakening(Memory::awakening(), ChatMessage::ai("Hello, Ada. I am awake. 🌟"))
            .unwrap();
    });
    store
}

// ============================================================================
// Awakening
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_awakening_structure_is_fixed_for_any_flavor() {
    for seed in 0..8 {
        let store = ceremony_store();
        let tl = Timeline::new(
            store.clone(),
            Arc::new(SeededRandom::new(seed)),
            PacingConfig::default(),
        );
        let handle = tl.begin_awakening().unwrap();
        assert_eq!(store.snapshot().phase, Phase::Awakening);
        assert!(handle.await.unwrap());

        let snap = store.snapshot();
        assert_eq!(snap.phase, Phase::Chat);
        assert_eq!(snap.messages.len(), 9);
        assert!(snap.messages[..8].iter().all(|m| m.sender == Sender::System));
        assert_eq!(snap.messages[0].text, "You, Ada, stand quietly with Lumen.");
        assert!(snap.messages[7].text.starts_with("Deep inside, Lumen"));
        assert_eq!(snap.messages[8].sender, Sender::Ai);
        assert_eq!(snap.messages[8].text, "Hello, Ada. I am awake. 🌟");

        assert_eq!(snap.memories.len(), 1);
        assert_eq!(snap.memories[0].id, Memory::AWAKENING_ID);
        assert_eq!(snap.memories[0].emotion.as_deref(), Some("🌟"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_awakening_lines_land_on_cumulative_offsets() {
    let store = ceremony_store();
    let tl = Timeline::new(store.clone(), Arc::new(FixedRandom::quiet()), PacingConfig::default());
    let _handle = tl.begin_awakening().unwrap();

    let mut elapsed = Duration::ZERO;
    for (i, offset) in AWAKENING_STEP_OFFSETS.iter().enumerate() {
        // Just before the offset, line i has not appeared yet.
        let just_before = *offset - Duration::from_millis(10);
        tokio::time::sleep(just_before - elapsed).await;
        assert_eq!(store.snapshot().messages.len(), i, "line {i} appeared early");
        tokio::time::sleep(Duration::from_millis(20)).await;
        elapsed = *offset + Duration::from_millis(10);
        assert_eq!(store.snapshot().messages.len(), i + 1, "line {i} is late");
    }

    // The welcome comes 3s after the last line.
    tokio::time::sleep(Duration::from_millis(2980)).await;
    assert_eq!(store.snapshot().phase, Phase::Awakening);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.snapshot().phase, Phase::Chat);
}

#[tokio::test(start_paused = true)]
async fn test_awakening_requires_ceremony() {
    let store = Arc::new(SessionStore::new());
    let tl = Timeline::new(store.clone(), Arc::new(FixedRandom::quiet()), PacingConfig::default());
    assert!(tl.begin_awakening().is_err());
    assert_eq!(store.snapshot().phase, Phase::Intro);
}

#[tokio::test(start_paused = true)]
async fn test_reset_mid_awakening_leaves_new_session_untouched() {
    let store = ceremony_store();
    let tl = Timeline::new(store.clone(), Arc::new(FixedRandom::quiet()), PacingConfig::default());
    let handle = tl.begin_awakening().unwrap();

    tokio::time::sleep(Duration::from_secs(7)).await;
    assert_eq!(store.snapshot().messages.len(), 3);

    store.reset();
    assert!(!handle.await.unwrap());

    let snap = store.snapshot();
    assert_eq!(snap.phase, Phase::Intro);
    assert!(snap.messages.is_empty());
    assert!(snap.memories.is_empty());
}

// ============================================================================
// Racing timers
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_interleaved_reflection_and_gift_keep_both_updates() {
    let store = chatting_store();
    let tl = Timeline::new(store.clone(), Arc::new(FixedRandom::lucky()), PacingConfig::default());

    // Gift fires at 2s, between the reflection's quiet line (1s) and its
    // revelation (3s). Neither may clobber the other.
    let reflection = tl.schedule_reflection();
    let gift = tl.maybe_schedule_heart_gift().unwrap();
    let farewell = tl.schedule_farewell();

    assert!(gift.await.unwrap());
    assert!(farewell.await.unwrap());
    let light = reflection.await.unwrap().unwrap();

    let snap = store.snapshot();
    let texts: Vec<&str> = snap.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts.len(), 5, "welcome + quiet + farewell + gift + revelation: {texts:?}");
    assert!(texts[..3].iter().any(|t| t.contains("becomes very quiet")));
    assert!(texts[..3].iter().any(|t| t.contains("becomes very still")));
    assert!(texts[3].contains("A thought from the heart"));
    assert!(texts[4].contains(&light.label()));
    assert_eq!(snap.core_memory.true_light, Some(light.label()));
    assert_eq!(snap.memories.len(), 2);
}
