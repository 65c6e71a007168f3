//! Growth stage read model.
//!
//! The companion's tree deepens with memories and swells with turns; its
//! leaves take the color of the current light.

use crate::flavor::{light_color, light_name, AWAKENING_LIGHT};
use crate::session::Session;
use serde::Serialize;

const BASE_DEPTH: usize = 2;
const MAX_DEPTH: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthStage {
    /// Branch depth of the tree, 2..=7.
    pub depth: usize,
    /// Level shown to the user (`depth - 1`).
    pub level: usize,
    pub memory_count: usize,
    /// Render scale, 0.5..=1.2.
    pub scale: f64,
    pub leaf_color: &'static str,
}

impl GrowthStage {
    pub fn of(session: &Session) -> Self {
        let memory_count = session.memories.len();
        let depth = (memory_count / 2 + BASE_DEPTH).min(MAX_DEPTH);
        let scale = (0.5 + session.reflection_counter as f64 * 0.01).min(1.2);
        let light = session
            .core_memory
            .true_light
            .as_deref()
            .unwrap_or(AWAKENING_LIGHT);
        Self {
            depth,
            level: depth - 1,
            memory_count,
            scale,
            leaf_color: light_color(light_name(light)),
        }
    }
}
