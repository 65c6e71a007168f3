use anyhow::Result;
use async_trait::async_trait;
use seedling_core::{CoreMemory, Emotion, Sender, Session};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

/// Everything a provider needs to produce one companion reply.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Prior user/companion lines, oldest first, ending with the line to answer.
    pub history: Vec<HistoryEntry>,
    pub ai_name: String,
    pub user_name: String,
    pub core_memory: CoreMemory,
    pub memories: Vec<String>,
    pub emotion: Emotion,
    /// One-line note on why the model is being asked to speak.
    pub context: String,
}

impl GenerationRequest {
    /// Build a request from a session snapshot. `skip_id` drops one message
    /// from the prior history (the line being answered, appended last as `prompt`).
    pub fn from_session(session: &Session, skip_id: Option<&str>, prompt: &str, context: &str) -> Self {
        let mut history: Vec<HistoryEntry> = session
            .conversation()
            .filter(|m| Some(m.id.as_str()) != skip_id)
            .map(|m| match m.sender {
                Sender::User => HistoryEntry::user(m.text.clone()),
                _ => HistoryEntry::model(m.text.clone()),
            })
            .collect();
        history.push(HistoryEntry::user(prompt));

        Self {
            history,
            ai_name: session.ai_name.clone(),
            user_name: session.user_name.clone(),
            core_memory: session.core_memory.clone(),
            memories: session.memory_texts(),
            emotion: session.current_emotion,
            context: context.to_string(),
        }
    }
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Produce the raw reply text. Tags and markers are left in place for the
    /// interpreter.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
