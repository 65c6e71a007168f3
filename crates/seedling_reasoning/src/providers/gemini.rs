//! Google Gemini `generateContent` provider.

use crate::llm::{GenerationClient, GenerationRequest, HistoryEntry, Role};
use crate::prompts::PersonaPrompt;
use anyhow::{bail, Context, Result};
use reqwest::Client;
use seedling_core::LlmConfig;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("{} is not set", config.api_key_env))?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout + Duration::from_secs(5));
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": PersonaPrompt::build(request) }] },
            "contents": contents(&request.history),
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
            }
        })
    }
}

/// Gemini rejects two consecutive turns from the same role, so adjacent
/// entries are folded together.
fn contents(history: &[HistoryEntry]) -> Vec<Value> {
    let mut folded: Vec<(Role, String)> = Vec::new();
    for entry in history {
        match folded.last_mut() {
            Some((role, text)) if *role == entry.role => {
                text.push('\n');
                text.push_str(&entry.text);
            }
            _ => folded.push((entry.role, entry.text.clone())),
        }
    }
    folded
        .into_iter()
        .map(|(role, text)| {
            json!({
                "role": role,
                "parts": [{ "text": text }]
            })
        })
        .collect()
}

fn extract_text(body: &Value) -> Result<String> {
    if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
        bail!("Prompt blocked by Gemini: {reason}");
    }
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .context("Gemini response has no candidate content")?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        bail!("Gemini returned an empty reply");
    }
    Ok(text)
}

#[async_trait::async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        tracing::debug!(model = %self.model, turns = request.history.len(), "Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Gemini API error {}: {}", status, text);
        }

        let body: Value = response.json().await.context("Failed to parse Gemini response")?;
        extract_text(&body)
    }
}
