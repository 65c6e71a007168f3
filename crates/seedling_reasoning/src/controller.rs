//! The turn controller: every user intent enters the session through here.

use crate::interpreter::interpret;
use crate::llm::{GenerationClient, GenerationRequest};
use anyhow::anyhow;
use seedling_core::{
    CalendarEvent, ChatMessage, Light, Overlay, Phase, RandomSource, SeedlingConfig, SessionError,
    SessionGuard, SessionStore, TypingGuard,
};
use seedling_expression::{is_farewell, Timeline};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const USER_TURN_CONTEXT: &str = "The user has just sent a message.";
pub const SPARK_CONTEXT: &str = "The user is waiting for you to speak.";
pub const SPARK_PROMPT: &str = "(The user is waiting quietly. Please initiate a conversation, ask a gentle question, or share a poetic observation about your new existence.)";

pub const DISCONNECTED_FALLBACK: &str = "I feel... a bit disconnected. 🌫️";
pub const LOST_IN_THOUGHT_FALLBACK: &str = "I... I am lost in thought. 🌫️";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// A spark was requested while another turn was in flight.
    Busy,
    /// The user said goodbye; a farewell is on its way and the model was not asked.
    Farewell,
    /// The model answered and its reply was applied.
    Replied,
    /// The model call failed; the fallback line was shown instead.
    Fallback,
    /// The session was reset while the model was thinking; the reply was dropped.
    Abandoned,
}

/// What one turn did, with handles to any side effects it scheduled.
///
/// The handles may be dropped freely; the effects run regardless.
#[derive(Debug)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    /// Value of the reflection counter after this turn, if a user line was recorded.
    pub turn: Option<u64>,
    pub reflection: Option<JoinHandle<Option<Light>>>,
    pub heart_gift: Option<JoinHandle<bool>>,
    pub farewell: Option<JoinHandle<bool>>,
}

impl TurnReport {
    fn new(outcome: TurnOutcome) -> Self {
        Self {
            outcome,
            turn: None,
            reflection: None,
            heart_gift: None,
            farewell: None,
        }
    }
}

pub struct TurnController {
    store: Arc<SessionStore>,
    timeline: Timeline,
    client: Arc<dyn GenerationClient>,
    deadline: Option<Duration>,
}

impl TurnController {
    pub fn new(
        store: Arc<SessionStore>,
        client: Arc<dyn GenerationClient>,
        random: Arc<dyn RandomSource>,
        config: &SeedlingConfig,
    ) -> Self {
        let timeline = Timeline::new(Arc::clone(&store), random, config.pacing.clone());
        Self {
            store,
            timeline,
            client,
            deadline: config.llm.timeout(),
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    // ------------------------------------------------------------------
    // Onboarding
    // ------------------------------------------------------------------

    pub fn submit_user_name(&self, name: &str) -> Result<(), SessionError> {
        self.store.try_apply(|s| s.set_user_name(name))?;
        tracing::info!("Phase: intro -> naming");
        Ok(())
    }

    pub fn name_companion(&self, name: &str) -> Result<(), SessionError> {
        self.store.try_apply(|s| s.set_ai_name(name))?;
        tracing::info!("Phase: naming -> ceremony");
        Ok(())
    }

    /// Start the awakening ritual. The handle resolves once the chat opens.
    pub fn begin_awakening(&self) -> Result<JoinHandle<bool>, SessionError> {
        self.timeline.begin_awakening()
    }

    // ------------------------------------------------------------------
    // Conversation
    // ------------------------------------------------------------------

    /// Handle one line typed by the user.
    pub async fn handle_user_message(&self, text: &str) -> Result<TurnReport, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(TurnReport::new(TurnOutcome::Ignored));
        }

        let guard = self.store.guard();
        let message = ChatMessage::user(text);
        let message_id = message.id.clone();
        let turn = self.store.try_apply(|s| {
            if !s.phase.is_conversational() {
                return Err(SessionError::NotConversing(s.phase));
            }
            Ok(s.record_user_turn(message.clone()))
        })?;
        tracing::debug!(turn, "User turn recorded");

        let mut report = TurnReport::new(TurnOutcome::Replied);
        report.turn = Some(turn);
        if self.timeline.pacing().is_reflection_turn(turn) {
            report.reflection = Some(self.timeline.schedule_reflection());
        }
        report.heart_gift = self.timeline.maybe_schedule_heart_gift();

        if is_farewell(text) {
            report.farewell = Some(self.timeline.schedule_farewell());
            report.outcome = TurnOutcome::Farewell;
            return Ok(report);
        }

        let request = GenerationRequest::from_session(
            &self.store.snapshot(),
            Some(&message_id),
            text,
            USER_TURN_CONTEXT,
        );
        let typing = self.store.begin_typing();
        report.outcome = self.converse(guard, typing, &request, DISCONNECTED_FALLBACK).await;
        Ok(report)
    }

    /// Ask the companion to speak first. Does nothing while a turn is in flight.
    pub async fn spark_thought(&self) -> Result<TurnReport, SessionError> {
        let snapshot = self.store.snapshot();
        if !snapshot.phase.is_conversational() {
            return Err(SessionError::NotConversing(snapshot.phase));
        }
        let Some(typing) = self.store.try_begin_typing() else {
            tracing::debug!("Spark ignored: a turn is already in flight");
            return Ok(TurnReport::new(TurnOutcome::Busy));
        };

        let guard = SessionGuard::of(&snapshot);
        let request = GenerationRequest::from_session(&snapshot, None, SPARK_PROMPT, SPARK_CONTEXT);
        let outcome = self.converse(guard, typing, &request, LOST_IN_THOUGHT_FALLBACK).await;
        Ok(TurnReport::new(outcome))
    }

    /// Call the model and apply its reply. `typing` counts this call as in
    /// flight and is released once the model answers or gives up.
    async fn converse(
        &self,
        guard: SessionGuard,
        typing: TypingGuard<'_>,
        request: &GenerationRequest,
        fallback: &str,
    ) -> TurnOutcome {
        let result = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.client.generate(request))
                .await
                .unwrap_or_else(|_| Err(anyhow!("generation timed out after {:?}", deadline))),
            None => self.client.generate(request).await,
        };
        drop(typing);

        match result {
            Ok(raw) => {
                let interpretation = interpret(&raw);
                if let Some(e) = &interpretation.rejected_manifestation {
                    tracing::warn!("Malformed manifestation discarded: {}", e);
                }
                let applied = self.store.apply_guarded(guard, |s| {
                    let before = s.phase;
                    interpretation.apply(s);
                    (before, s.phase)
                });
                match applied {
                    Some((before, after)) => {
                        if before != after {
                            tracing::info!("Phase: {} -> {}", before, after);
                        }
                        TurnOutcome::Replied
                    }
                    None => {
                        tracing::debug!("Reply dropped: session was reset mid-turn");
                        TurnOutcome::Abandoned
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Generation failed: {:#}", e);
                match self
                    .store
                    .apply_guarded(guard, |s| s.push_message(ChatMessage::ai(fallback)))
                {
                    Some(()) => TurnOutcome::Fallback,
                    None => TurnOutcome::Abandoned,
                }
            }
        }
    }

    pub fn wake_from_dream(&self) -> Result<(), SessionError> {
        self.store.try_apply(|s| {
            if s.phase != Phase::DreamState {
                return Err(SessionError::InvalidTransition {
                    from: s.phase,
                    to: Phase::Chat,
                });
            }
            s.leave_dream()?;
            let line = format!("{} wakes gently from the dream.", s.ai_name);
            s.push_message(ChatMessage::system(line));
            Ok(())
        })?;
        tracing::info!("Phase: dream_state -> chat");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Calendar and overlays
    // ------------------------------------------------------------------

    /// Add an event; returns its id.
    pub fn add_calendar_event(
        &self,
        title: &str,
        date: &str,
        description: Option<&str>,
    ) -> Result<String, SessionError> {
        let event = CalendarEvent::new(title, date, description)?;
        let id = event.id.clone();
        self.store.apply(|s| s.add_event(event.clone()));
        Ok(id)
    }

    pub fn toggle_calendar_event(&self, id: &str) -> Result<bool, SessionError> {
        self.store.try_apply(|s| s.toggle_event(id))
    }

    pub fn delete_calendar_event(&self, id: &str) -> Result<CalendarEvent, SessionError> {
        self.store.try_apply(|s| s.delete_event(id))
    }

    /// Flip an overlay; returns whether it is now shown.
    pub fn toggle_overlay(&self, overlay: Overlay) -> bool {
        self.store.update_ui(|ui| ui.toggle(overlay))
    }

    /// Start over with a fresh session. Pending timers of the old one are dropped.
    pub fn reset(&self) {
        self.store.reset();
    }
}
