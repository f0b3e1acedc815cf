//! Completion gateway backed by the Gemini `generateContent` endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{AppError, GatewayConfig, Speaker, Turn};
use crate::ports::{CompletionGateway, CompletionRequest};

const X_GOOG_API_KEY: &str = "X-Goog-Api-Key";
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Single-attempt HTTP client; wrap in `RetryingCompletionGateway` for retries.
#[derive(Clone)]
pub struct HttpCompletionGateway {
    api_key: String,
    endpoint: Url,
    timeout_secs: u64,
    client: Client,
}

impl std::fmt::Debug for HttpCompletionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionGateway")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl HttpCompletionGateway {
    pub fn new(api_key: String, config: &GatewayConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            endpoint: generate_endpoint(&config.api_url, &config.model)?,
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    /// Read the API key from `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
    pub fn from_env_with_config(config: &GatewayConfig) -> Result<Self, AppError> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|value| !value.trim().is_empty()))
            .ok_or_else(|| {
                AppError::Configuration(
                    "GEMINI_API_KEY (or GOOGLE_API_KEY) environment variable not set".into(),
                )
            })?;

        Self::new(api_key, config)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn map_transport_error(&self, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            return AppError::GatewayTimeout { timeout_secs: self.timeout_secs };
        }
        AppError::GatewayUnavailable {
            message: format!("HTTP request failed: {}", error),
            status: error.status().map(|status| status.as_u16()),
        }
    }
}

fn generate_endpoint(api_url: &Url, model: &str) -> Result<Url, AppError> {
    let mut endpoint = api_url.clone();
    endpoint
        .path_segments_mut()
        .map_err(|_| AppError::InvalidConfig(format!("api_url '{}' cannot be a base URL", api_url)))?
        .pop_if_empty()
        .push(&format!("{}:generateContent", model.trim()));
    Ok(endpoint)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

fn build_request<'a>(request: &'a CompletionRequest) -> ApiRequest<'a> {
    let mut contents: Vec<Content<'a>> = request.history.iter().map(history_content).collect();
    contents.push(Content { role: "user", parts: [Part { text: &request.prompt }] });
    ApiRequest { contents, generation_config: GenerationConfig { temperature: request.temperature } }
}

fn history_content(turn: &Turn) -> Content<'_> {
    let role = match turn.speaker {
        Speaker::Student => "user",
        Speaker::Tutor => "model",
    };
    Content { role, parts: [Part { text: &turn.text }] }
}

fn extract_text(response: ApiResponse) -> Result<String, AppError> {
    if let Some(reason) = response.prompt_feedback.and_then(|feedback| feedback.block_reason) {
        return Err(AppError::GatewayInvalidResponse(format!("prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AppError::GatewayInvalidResponse("no candidates in response".into()))?;

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(AppError::GatewayInvalidResponse(format!(
            "empty completion (finish reason: {})",
            reason
        )));
    }
    Ok(text.trim().to_string())
}

impl CompletionGateway for HttpCompletionGateway {
    fn generate(&self, request: &CompletionRequest) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(X_GOOG_API_KEY, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&build_request(request))
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            let api_response: ApiResponse = response.json().map_err(|e| {
                if e.is_timeout() {
                    AppError::GatewayTimeout { timeout_secs: self.timeout_secs }
                } else {
                    AppError::GatewayInvalidResponse(format!("Failed to parse response: {}", e))
                }
            })?;
            return extract_text(api_response);
        }

        let error_text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
        Err(AppError::GatewayUnavailable {
            message: format!("API error ({}): {}", status.as_u16(), error_text.trim()),
            status: Some(status.as_u16()),
        })
    }
}
