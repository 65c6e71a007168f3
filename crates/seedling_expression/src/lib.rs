//! # Seedling Expression
//!
//! Everything the companion does on a clock rather than in reply to a
//! message: the scripted awakening, the quiet reflections, unprompted heart
//! gifts and the delayed farewell.
//!
//! All of it runs as fire-and-forget tokio tasks owned by a [`Timeline`].
//! Each task remembers which session it was scheduled for and writes through
//! [`SessionStore::apply_guarded`], so a task that outlives a reset does
//! nothing.
//!
//! [`SessionStore::apply_guarded`]: seedling_core::SessionStore::apply_guarded

mod awakening;
mod farewell;
mod gifts;
mod reflection;
mod timeline;

pub use awakening::{AwakeningScript, AWAKENING_SETTLE, AWAKENING_STEP_OFFSETS};
pub use farewell::{compose_farewell, is_farewell, FAREWELL_DELAY};
pub use gifts::{heart_gift_line, HEART_GIFT_DELAY};
pub use reflection::{REFLECTION_DELAY, REFLECTION_REVEAL};
pub use timeline::Timeline;
