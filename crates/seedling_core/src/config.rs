use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedlingConfig {
    pub llm: LlmConfig,
    pub pacing: PacingConfig,
}

impl SeedlingConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: SeedlingConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.llm.timeout_secs = Some(n);
            }
        }
        if let Ok(v) = std::env::var("SEEDLING_REFLECTION_INTERVAL") {
            if let Ok(n) = v.parse() {
                self.pacing.reflection_interval = n;
            }
        }
        if let Ok(v) = std::env::var("SEEDLING_TIME_SCALE") {
            if let Ok(n) = v.parse() {
                self.pacing.time_scale = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `"gemini"` or `"mock"`.
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Overall deadline for one generation call. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            base_url: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.9,
            max_output_tokens: 1024,
            timeout_secs: Some(60),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// A reflection is scheduled every time the turn counter reaches a
    /// multiple of this value.
    pub reflection_interval: u64,
    /// Probability that a turn schedules an unprompted heart gift.
    pub gift_chance: f64,
    /// Multiplier applied to every scripted delay.
    pub time_scale: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            reflection_interval: 5,
            gift_chance: 0.10,
            time_scale: 1.0,
        }
    }
}

impl PacingConfig {
    pub fn reflection_interval(&self) -> u64 {
        self.reflection_interval.max(1)
    }

    pub fn gift_chance(&self) -> f64 {
        if self.gift_chance.is_finite() {
            self.gift_chance.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Scale a scripted delay. Negative or non-finite scales count as 1.0.
    pub fn scale(&self, delay: Duration) -> Duration {
        if self.time_scale.is_finite() && self.time_scale >= 0.0 {
            delay.mul_f64(self.time_scale)
        } else {
            delay
        }
    }

    /// Whether turn number `counter` triggers a reflection.
    pub fn is_reflection_turn(&self, counter: u64) -> bool {
        counter > 0 && counter % self.reflection_interval() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================
