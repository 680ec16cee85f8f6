//! Text generation collaborator
//!
//! Provides a `TextGenerator` trait (prompt + system instructions in, text out)
//! and a Gemini `generateContent` implementation. The generator is treated as
//! unreliable: callers get either text or a `GenerationError`, and are
//! expected to validate whatever text comes back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

use crate::config::GenerationSettings;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

// ============================================================================
// TextGenerator trait
// ============================================================================

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt` under the given system instructions.
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, GenerationError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Response contained no candidate text")]
    EmptyResponse,

    #[error("Missing API key")]
    MissingApiKey,

    #[error("All {attempts} generation attempts failed: {last}")]
    RetryExhausted { attempts: usize, last: String },
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub model: String,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    pub timeout: Duration,
    pub temperature: f32,
}

impl GenerationConfig {
    /// Builds a client config from file settings; the key falls back to `GOOGLE_API_KEY`.
    pub fn from_settings(settings: &GenerationSettings, api_key: Option<String>) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .unwrap_or_default();

        Self {
            api_key,
            model: settings.model.clone(),
            max_retries: settings.max_retries,
            retry_delay_ms: settings.retry_delay_ms,
            timeout: Duration::from_secs(settings.timeout_seconds),
            temperature: settings.temperature,
        }
    }
}

// ============================================================================
// Gemini API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationParams,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    temperature: f32,
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: u16,
    message: String,
}

// ============================================================================
// GeminiTextClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct GeminiTextClient {
    client: Client,
    config: GenerationConfig,
    base_url: String,
}

impl GeminiTextClient {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        Self::with_base_url(config, GEMINI_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL (tests, proxies).
    pub fn with_base_url(config: GenerationConfig, base_url: String) -> Result<Self, GenerationError> {
        if config.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    async fn generate_once(&self, prompt: &str, system: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.config.model
        );

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationParams {
                temperature: self.config.temperature,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| e.without_url())?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (code, message) = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| (e.code, e.message))
                .unwrap_or((status.as_u16(), body));

            tracing::error!(code = code, message = %message, "Gemini generation API error");
            return Err(GenerationError::Api { code, message });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| e.without_url())?;
        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiTextClient {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, GenerationError> {
        let retry_strategy = ExponentialBackoff::from_millis(self.config.retry_delay_ms)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries);

        Retry::spawn(retry_strategy, || self.generate_once(prompt, system))
            .await
            .map_err(|e| {
                tracing::error!(
                    attempts = self.config.max_retries + 1,
                    error = %e,
                    "All generation attempts failed"
                );
                GenerationError::RetryExhausted {
                    attempts: self.config.max_retries + 1,
                    last: e.to_string(),
                }
            })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ============================================================================
// TESTS
// ============================================================================
