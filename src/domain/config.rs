//! Tutor configuration loaded from `socra.toml`.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{AppError, DisciplineRule};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TutorConfig {
    /// Dialogue engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Conversation history sent to the completion service.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Completion service configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Discipline rules; when empty the built-in rules are used.
    #[serde(default)]
    pub disciplines: Vec<DisciplineRule>,
}

impl TutorConfig {
    pub fn parse_toml(content: &str) -> Result<Self, AppError> {
        let config: TutorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.engine.validate()?;
        self.history.validate()?;
        self.gateway.validate()?;
        for rule in &self.disciplines {
            rule.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum matcher score before committing to a concept.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Minimum score for a mid-dialogue reply to switch concepts.
    #[serde(default = "default_pivot_confidence")]
    pub pivot_confidence: f64,
    /// Hinted re-asks allowed per question: 0 or 1.
    #[serde(default = "default_hint_retry_limit")]
    pub hint_retry_limit: u32,
    /// Student turns allowed per session.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            pivot_confidence: default_pivot_confidence(),
            hint_retry_limit: default_hint_retry_limit(),
            max_turns: default_max_turns(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(AppError::InvalidConfig(
                "min_confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pivot_confidence) {
            return Err(AppError::InvalidConfig(
                "pivot_confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.hint_retry_limit > MAX_HINT_RETRY_LIMIT {
            return Err(AppError::InvalidConfig(format!(
                "hint_retry_limit must be at most {}",
                MAX_HINT_RETRY_LIMIT
            )));
        }
        if self.max_turns == 0 {
            return Err(AppError::InvalidConfig("max_turns must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn default_min_confidence() -> f64 {
    0.25
}

fn default_pivot_confidence() -> f64 {
    0.6
}

/// A question is re-asked with help at most once before the dialogue moves on.
pub const MAX_HINT_RETRY_LIMIT: u32 = 1;

fn default_hint_retry_limit() -> u32 {
    1
}

fn default_max_turns() -> u32 {
    40
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Most recent exchanges forwarded verbatim.
    #[serde(default = "default_verbatim_turns")]
    pub verbatim_turns: usize,
    /// Summarize exchanges older than the verbatim window instead of dropping them.
    #[serde(default = "default_summarize")]
    pub summarize: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { verbatim_turns: default_verbatim_turns(), summarize: default_summarize() }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.verbatim_turns == 0 {
            return Err(AppError::InvalidConfig("verbatim_turns must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn default_verbatim_turns() -> usize {
    10
}

fn default_summarize() -> bool {
    true
}

/// Completion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Base URL of the models collection.
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    /// Model identifier appended to the base URL.
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum attempts per completion.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay between retries in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.model.trim().is_empty() {
            return Err(AppError::InvalidConfig("model must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::InvalidConfig("timeout_secs must be greater than 0".to_string()));
        }
        if self.max_retries == 0 {
            return Err(AppError::InvalidConfig("max_retries must be greater than 0".to_string()));
        }
        if self.retry_delay_ms == 0 {
            return Err(AppError::InvalidConfig(
                "retry_delay_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_api_url() -> Url {
    Url::parse("https://generativelanguage.googleapis.com/v1beta/models/")
        .expect("Default API URL must be valid")
}

fn default_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}
