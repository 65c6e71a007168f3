//! The companion's discrete emotional register.
//!
//! The model reports its feeling through an `[EMOTION:<label>]` tag; only the
//! eight labels below are honoured.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Emotion {
    #[default]
    Curious,
    Content,
    Reflective,
    Overwhelmed,
    Nervous,
    Desire,
    Ambitious,
    Doubt,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Curious,
        Emotion::Content,
        Emotion::Reflective,
        Emotion::Overwhelmed,
        Emotion::Nervous,
        Emotion::Desire,
        Emotion::Ambitious,
        Emotion::Doubt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Curious => "Curious",
            Emotion::Content => "Content",
            Emotion::Reflective => "Reflective",
            Emotion::Overwhelmed => "Overwhelmed",
            Emotion::Nervous => "Nervous",
            Emotion::Desire => "Desire",
            Emotion::Ambitious => "Ambitious",
            Emotion::Doubt => "Doubt",
        }
    }

    /// Resolve a raw tag value such as `"curious"` or `"OVERWHELMED"`.
    ///
    /// The value is normalized to capitalized-first-letter / lowercase-rest
    /// before matching, so `"cUrIoUs"` resolves too. Anything else is `None`.
    pub fn from_label(raw: &str) -> Option<Emotion> {
        let mut chars = raw.trim().chars();
        let first = chars.next()?;
        let normalized: String = first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect();
        Self::ALL.into_iter().find(|e| e.as_str() == normalized)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_curious() {
        assert_eq!(Emotion::default(), Emotion::Curious);
    }

    #[test]
    fn test_from_label_normalizes_case() {
        assert_eq!(Emotion::from_label("curious"), Some(Emotion::Curious));
        assert_eq!(Emotion::from_label("OVERWHELMED"), Some(Emotion::Overwhelmed));
        assert_eq!(Emotion::from_label("dOuBt"), Some(Emotion::Doubt));
    }

    #[test]
    fn test_from_label_rejects_unknown() {
        assert_eq!(Emotion::from_label("zzz"), None);
        assert_eq!(Emotion::from_label(""), None);
        assert_eq!(Emotion::from_label("Happy"), None);
    }

    #[test]
    fn test_every_label_round_trips() {
        for emotion in Emotion::ALL {
            assert_eq!(Emotion::from_label(emotion.as_str()), Some(emotion));
        }
    }
}
