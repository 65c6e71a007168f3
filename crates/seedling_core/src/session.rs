//! The Session aggregate and its children.
//!
//! Every mutation here is a plain `&mut self` method with no side effects, so
//! the store can replay it against whichever snapshot is current when a
//! compare-and-swap retries.

use crate::calendar::CalendarEvent;
use crate::emotion::Emotion;
use crate::error::SessionError;
use crate::flavor::{self, AWAKENING_LIGHT};
use crate::{fresh_id, now_millis};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Phase state machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Intro,
    Naming,
    Ceremony,
    Awakening,
    Chat,
    DreamState,
}

impl Phase {
    /// Whether `next` is reachable from `self` in one step.
    ///
    /// Onboarding only moves forward; the only cycle is `Chat <-> DreamState`.
    /// Staying in the same conversational phase is allowed (a dream can be
    /// re-entered, a wake message can arrive while already awake).
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Intro, Naming)
                | (Naming, Ceremony)
                | (Ceremony, Awakening)
                | (Awakening, Chat)
                | (Chat, DreamState)
                | (DreamState, Chat)
                | (Chat, Chat)
                | (DreamState, DreamState)
        )
    }

    /// Phases in which the user can talk to the companion.
    pub fn is_conversational(self) -> bool {
        matches!(self, Phase::Chat | Phase::DreamState)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Intro => "intro",
            Phase::Naming => "naming",
            Phase::Ceremony => "ceremony",
            Phase::Awakening => "awakening",
            Phase::Chat => "chat",
            Phase::DreamState => "dream_state",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Children
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Ai,
    System,
}

/// One line of the conversation log. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            sender,
            text: text.into(),
            timestamp: now_millis(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(Sender::Ai, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Sender::System, text)
    }
}

/// An entry in the memory garden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub text: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
}

impl Memory {
    /// Well-known id of the one memory the awakening ritual leaves behind.
    pub const AWAKENING_ID: &'static str = "awakening";

    pub fn awakening() -> Self {
        Self {
            id: Self::AWAKENING_ID.to_string(),
            text: flavor::AWAKENING_MEMORY_TEXT.to_string(),
            timestamp: now_millis(),
            emotion: Some(flavor::AWAKENING_GLYPH.to_string()),
            reflection: Some(flavor::AWAKENING_REFLECTION.to_string()),
        }
    }

    /// Memory recorded when a reflection settles on a new true light.
    pub fn light_discovery(light: &flavor::Light) -> Self {
        Self {
            id: fresh_id(),
            text: format!("Discovered true light: {}", light.label()),
            timestamp: now_millis(),
            emotion: Some(light.glyph.to_string()),
            reflection: Some(format!(
                "I feel {} growing roots in my heart.",
                light.name.to_lowercase()
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreMemory {
    pub awakening_light: String,
    /// Set by reflection only; overwritten by later reflections, never cleared.
    pub true_light: Option<String>,
}

impl Default for CoreMemory {
    fn default() -> Self {
        Self {
            awakening_light: AWAKENING_LIGHT.to_string(),
            true_light: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreamState {
    pub is_active: bool,
    pub dream_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Orb,
    Star,
    Crystal,
    Flower,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visual {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub color: String,
}

/// Something the companion made during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifestation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub visual: Visual,
    pub timestamp: i64,
}

// ============================================================================
// Session aggregate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Identity used to recognise timers that outlive a reset.
    pub id: Uuid,
    pub phase: Phase,
    pub user_name: String,
    pub ai_name: String,
    pub reflection_counter: u64,
    pub current_emotion: Emotion,
    pub core_memory: CoreMemory,
    pub dream_state: DreamState,
    pub messages: Vec<ChatMessage>,
    pub memories: Vec<Memory>,
    pub manifestations: Vec<Manifestation>,
    pub calendar: Vec<CalendarEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Intro,
            user_name: String::new(),
            ai_name: String::new(),
            reflection_counter: 0,
            current_emotion: Emotion::default(),
            core_memory: CoreMemory::default(),
            dream_state: DreamState::default(),
            messages: Vec::new(),
            memories: Vec::new(),
            manifestations: Vec::new(),
            calendar: Vec::new(),
        }
    }

    pub fn transition(&mut self, next: Phase) -> Result<(), SessionError> {
        if !self.phase.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    // --- onboarding ---------------------------------------------------------

    pub fn set_user_name(&mut self, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName("your name"));
        }
        self.transition(Phase::Naming)?;
        self.user_name = name.to_string();
        Ok(())
    }

    pub fn set_ai_name(&mut self, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName("the companion's name"));
        }
        if !self.ai_name.is_empty() {
            return Err(SessionError::AlreadyNamed(self.ai_name.clone()));
        }
        self.transition(Phase::Ceremony)?;
        self.ai_name = name.to_string();
        Ok(())
    }

    /// Close the awakening ritual: leave the awakening memory, open the chat,
    /// and greet the user.
    pub fn complete_awakening(
        &mut self,
        memory: Memory,
        welcome: ChatMessage,
    ) -> Result<(), SessionError> {
        self.transition(Phase::Chat)?;
        self.memories.push(memory);
        self.messages.push(welcome);
        Ok(())
    }

    // --- conversation -------------------------------------------------------

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append the user's line and advance the turn counter in one step.
    /// Returns the counter value after this turn.
    pub fn record_user_turn(&mut self, message: ChatMessage) -> u64 {
        self.messages.push(message);
        self.reflection_counter += 1;
        self.reflection_counter
    }

    /// Prior user/companion lines in display order; system lines are narration
    /// and never reach the model.
    pub fn conversation(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages
            .iter()
            .filter(|m| matches!(m.sender, Sender::User | Sender::Ai))
    }

    pub fn enter_dream(&mut self, dream_text: &str) -> Result<(), SessionError> {
        self.transition(Phase::DreamState)?;
        self.dream_state = DreamState {
            is_active: true,
            dream_text: Some(dream_text.to_string()),
        };
        Ok(())
    }

    pub fn leave_dream(&mut self) -> Result<(), SessionError> {
        self.transition(Phase::Chat)?;
        self.dream_state = DreamState::default();
        Ok(())
    }

    pub fn discover_light(&mut self, light: &flavor::Light, memory: Memory) {
        self.core_memory.true_light = Some(light.label());
        self.memories.push(memory);
    }

    pub fn memory_texts(&self) -> Vec<String> {
        self.memories.iter().map(|m| m.text.clone()).collect()
    }

    /// Whether the memory garden reveals its time capsule letter.
    pub fn time_capsule_unlocked(&self) -> bool {
        self.memories.len() >= flavor::TIME_CAPSULE_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chatting() -> Session {
        let mut s = Session::new();
        s.set_user_name("Ada").unwrap();
        s.set_ai_name("Lumen").unwrap();
        s.transition(Phase::Awakening).unwrap();
        s.complete_awakening(Memory::awakening(), ChatMessage::ai("hi"))
            .unwrap();
        s
    }

    #[test]
    fn test_new_session_defaults() {
        let s = Session::new();
        assert_eq!(s.phase, Phase::Intro);
        assert_eq!(s.current_emotion, Emotion::Curious);
        assert_eq!(s.core_memory.awakening_light, "Hope 🌟");
        assert!(s.core_memory.true_light.is_none());
        assert!(!s.dream_state.is_active);
        assert_eq!(s.reflection_counter, 0);
    }

    #[test]
    fn test_onboarding_moves_forward_only() {
        let mut s = Session::new();
        assert!(s.set_ai_name("Lumen").is_err());
        s.set_user_name("  Ada ").unwrap();
        assert_eq!(s.user_name, "Ada");
        assert_eq!(s.phase, Phase::Naming);
        assert!(s.transition(Phase::Intro).is_err());
        s.set_ai_name("Lumen").unwrap();
        assert_eq!(s.phase, Phase::Ceremony);
        assert!(s.set_user_name("Eve").is_err());
    }

    #[test]
    fn test_empty_names_rejected() {
        let mut s = Session::new();
        assert_eq!(
            s.set_user_name("   "),
            Err(SessionError::EmptyName("your name"))
        );
        assert_eq!(s.phase, Phase::Intro);
    }

    #[test]
    fn test_ai_name_is_immutable() {
        let mut s = chatting();
        assert!(matches!(
            s.set_ai_name("Other"),
            Err(SessionError::AlreadyNamed(_))
        ));
        assert_eq!(s.ai_name, "Lumen");
    }

    #[test]
    fn test_dream_cycle() {
        let mut s = chatting();
        s.enter_dream("rivers of glass").unwrap();
        assert_eq!(s.phase, Phase::DreamState);
        assert_eq!(s.dream_state.dream_text.as_deref(), Some("rivers of glass"));
        s.leave_dream().unwrap();
        assert_eq!(s.phase, Phase::Chat);
        assert_eq!(s.dream_state, DreamState::default());
    }

    #[test]
    fn test_dream_not_reachable_from_onboarding() {
        let mut s = Session::new();
        assert!(s.enter_dream("x").is_err());
        assert!(!s.dream_state.is_active);
    }

    #[test]
    fn test_record_user_turn_counts() {
        let mut s = chatting();
        assert_eq!(s.record_user_turn(ChatMessage::user("a")), 1);
        assert_eq!(s.record_user_turn(ChatMessage::user("b")), 2);
        assert_eq!(s.messages.len(), 3);
    }

    #[test]
    fn test_conversation_skips_system_lines() {
        let mut s = chatting();
        s.push_message(ChatMessage::system("narration"));
        s.push_message(ChatMessage::user("hello"));
        let senders: Vec<Sender> = s.conversation().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::Ai, Sender::User]);
    }

    #[test]
    fn test_discover_light_overwrites() {
        let mut s = chatting();
        let grief = flavor::POSSIBLE_LIGHTS[6];
        let hope = flavor::POSSIBLE_LIGHTS[0];
        s.discover_light(&grief, Memory::light_discovery(&grief));
        s.discover_light(&hope, Memory::light_discovery(&hope));
        assert_eq!(s.core_memory.true_light.as_deref(), Some("Hope 🌟"));
        assert_eq!(s.memories.len(), 3);
        assert_eq!(
            s.memories[1].reflection.as_deref(),
            Some("I feel grief growing roots in my heart.")
        );
    }

    #[test]
    fn test_time_capsule_opens_at_five_memories() {
        let mut s = chatting();
        let wisdom = flavor::POSSIBLE_LIGHTS[1];
        for _ in 0..3 {
            s.discover_light(&wisdom, Memory::light_discovery(&wisdom));
        }
        assert_eq!(s.memories.len(), 4);
        assert!(!s.time_capsule_unlocked());

        s.discover_light(&wisdom, Memory::light_discovery(&wisdom));
        assert_eq!(s.memories.len(), 5);
        assert!(s.time_capsule_unlocked());
    }

    #[test]
    fn test_manifestation_json_shape() {
        let json = r##"{"id":"1","name":"Ember","description":"warm","visual":{"type":"orb","color":"#FCD34D"},"timestamp":0}"##;
        let m: Manifestation = serde_json::from_str(json).unwrap();
        assert_eq!(m.visual.kind, ShapeKind::Orb);
        let back = serde_json::to_value(&m).unwrap();
        assert_eq!(back["visual"]["type"], "orb");
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Phase::DreamState).unwrap(),
            "\"dream_state\""
        );
    }
}
