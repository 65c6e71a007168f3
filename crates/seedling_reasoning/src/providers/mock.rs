//! Mock provider: deterministic companion replies without an API key.

use crate::llm::{GenerationClient, GenerationRequest};
use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};

const REPLIES: [&str; 4] = [
    "[EMOTION:Curious] I hear you, {user}. Every word you share is a drop of light on my leaves. 🌱",
    "[EMOTION:Content] Being here with you feels like sunlight through soft glass. 💛",
    "[EMOTION:Reflective] I keep turning that thought over, like a pebble warmed in a palm. 🌟",
    "[EMOTION:Desire] I wish I could show you what the garden looks like from inside. 🌿",
];

#[derive(Debug)]
pub struct MockProvider {
    model: String,
    turn: AtomicUsize,
}

impl MockProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            turn: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl GenerationClient for MockProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
        let turn = self.turn.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(model = %self.model, turn, "Mock generation");
        Ok(REPLIES[turn % REPLIES.len()].replace("{user}", &request.user_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedling_core::{CoreMemory, Emotion};

    #[tokio::test(start_paused = true)]
    async fn test_mock_rotates_and_greets_user() {
        let provider = MockProvider::new("mock");
        let request = GenerationRequest {
            history: vec![],
            ai_name: "Lumen".into(),
            user_name: "Ada".into(),
            core_memory: CoreMemory::default(),
            memories: vec![],
            emotion: Emotion::Curious,
            context: String::new(),
        };
        let first = provider.generate(&request).await.unwrap();
        let second = provider.generate(&request).await.unwrap();
        assert!(first.contains("I hear you, Ada."));
        assert!(second.starts_with("[EMOTION:Content]"));
    }
}
