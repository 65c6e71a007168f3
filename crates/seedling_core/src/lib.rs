//! # Seedling Core
//!
//! The single source of truth for a companion session: the data model, the
//! phase state machine, and the [`SessionStore`] that every other subsystem
//! reads from and writes to.
//!
//! Nothing in here performs I/O or sleeps. Timing lives in
//! `seedling_expression`, the model round-trip in `seedling_reasoning`.

pub mod calendar;
pub mod config;
pub mod emotion;
pub mod error;
pub mod flavor;
pub mod growth;
pub mod random;
pub mod session;
pub mod store;

pub use calendar::CalendarEvent;
pub use config::{LlmConfig, PacingConfig, SeedlingConfig};
pub use emotion::Emotion;
pub use error::SessionError;
pub use flavor::Light;
pub use growth::GrowthStage;
pub use random::{FixedRandom, RandomSource, SeededRandom, ThreadRandom};
pub use session::{
    ChatMessage, CoreMemory, DreamState, Manifestation, Memory, Phase, Sender, Session, ShapeKind,
    Visual,
};
pub use store::{Overlay, SessionGuard, SessionStore, TypingGuard, UiState};

/// Wall-clock timestamp in milliseconds, used for every record the session creates.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fresh opaque identifier for messages, memories, manifestations and events.
pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
