//! Text-generation provider abstraction.
//!
//! This module provides the abstraction layer for the generative-text
//! backends the changelog pipeline can talk to, keeping a consistent
//! interface while each vendor keeps its own request schema, auth header
//! and response nesting.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_NEW_TOKENS: u32 = 512;

/// Error type for provider construction and generation calls.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key required for {0} provider")]
    MissingApiKey(&'static str),
    #[error("invalid provider configuration: {0}")]
    Config(String),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Supported provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Text-generation-inference router (`model`, `inputs`).
    HfInference,
    /// Sequence-to-sequence task endpoint (`model`, `task`, `inputs`,
    /// `parameters.max_new_tokens`).
    HfSeq2Seq,
    /// Plain-text endpoint (`text` in, `text` out).
    PlainText,
    /// Chat-completion endpoint (`model`, `messages[]`, `max_tokens`).
    OpenAiChat,
    /// Gemini generateContent endpoint (`contents[]`).
    Gemini,
    /// Deterministic canned responses - testing only.
    Stub,
}

impl ProviderKind {
    /// Environment variable conventionally holding this provider's
    /// credential.
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::HfInference | ProviderKind::HfSeq2Seq => Some("HF_TOKEN"),
            ProviderKind::PlainText => None,
            ProviderKind::OpenAiChat => Some("OPENAI_API_KEY"),
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
            ProviderKind::Stub => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::HfInference => "hf-inference",
            ProviderKind::HfSeq2Seq => "hf-seq2seq",
            ProviderKind::PlainText => "plain-text",
            ProviderKind::OpenAiChat => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Stub => "stub",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hf-inference" => Ok(ProviderKind::HfInference),
            "hf-seq2seq" => Ok(ProviderKind::HfSeq2Seq),
            "plain-text" => Ok(ProviderKind::PlainText),
            "openai" => Ok(ProviderKind::OpenAiChat),
            "gemini" => Ok(ProviderKind::Gemini),
            "stub" => Ok(ProviderKind::Stub),
            other => Err(LlmError::Config(format!(
                "unknown provider '{}' (expected hf-inference, hf-seq2seq, plain-text, openai, gemini or stub)",
                other
            ))),
        }
    }
}

/// Configuration shared by all providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_new_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

impl LlmConfig {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: None,
            base_url: None,
            max_new_tokens: None,
            timeout_seconds: None,
        }
    }
}

/// Information about a provider instance.
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub model: String,
}

/// Abstract interface for generative-text backends.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt.
    ///
    /// `Ok(Some(text))` when the response carried extractable text,
    /// `Ok(None)` when the call succeeded but no text field was found,
    /// `Err` on transport, timeout or non-success status.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError>;

    /// Get provider information.
    fn info(&self) -> ProviderInfo;
}

fn build_client(config: &LlmConfig) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(
            config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ))
        .build()
        .map_err(|e| LlmError::Http(format!("failed to create HTTP client: {}", e)))
}

/// Check the status and parse the body, keeping the raw body text for
/// error reporting.
async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = response.status();
    let raw_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    if !status.is_success() {
        return Err(LlmError::Api {
            status: status.as_u16(),
            body: raw_body,
        });
    }

    serde_json::from_str(&raw_body).map_err(|e| LlmError::Parse(format!("{}", e)))
}

/// Text-generation-inference style extraction: array-of-object
/// `[0].generated_text` with a `summary_text` fallback, or the same fields
/// on a bare object response.
fn extract_generated_text(value: &serde_json::Value) -> Option<String> {
    let field = |v: &serde_json::Value| {
        v.get("generated_text")
            .or_else(|| v.get("summary_text"))
            .and_then(|t| t.as_str())
            .map(|s| s.to_string())
    };
    match value {
        serde_json::Value::Array(items) => items.first().and_then(field),
        other => field(other),
    }
}

/// Chat-completion extraction: `choices[0].message.content`.
fn extract_chat_text(value: &serde_json::Value) -> Option<String> {
    value
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|s| s.to_string())
}

/// Gemini extraction: `candidates[0].content.parts[0].text`.
fn extract_gemini_text(value: &serde_json::Value) -> Option<String> {
    value
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .map(|s| s.to_string())
}

/// Plain-text extraction: top-level `text` field.
fn extract_plain_text(value: &serde_json::Value) -> Option<String> {
    value
        .get("text")
        .and_then(|t| t.as_str())
        .map(|s| s.to_string())
}

// ---------------------------------------------------------------------------
// Hugging Face router (text-generation-inference shape)
// ---------------------------------------------------------------------------

pub struct HfInferenceProvider {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct HfInferenceRequest<'a> {
    model: &'a str,
    inputs: &'a str,
}

impl HfInferenceProvider {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_none() {
            return Err(LlmError::MissingApiKey("hf-inference"));
        }
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TextGenerator for HfInferenceProvider {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey("hf-inference"))?;
        let url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://router.huggingface.co/hf-inference");

        let request = HfInferenceRequest {
            model: &self.config.model,
            inputs: prompt,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Http(format!("{}", e)))?;

        let value = read_json(response).await?;
        Ok(extract_generated_text(&value))
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Hugging Face Inference",
            model: self.config.model.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Hugging Face sequence-to-sequence task endpoint
// ---------------------------------------------------------------------------

pub struct HfSeq2SeqProvider {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct HfSeq2SeqRequest<'a> {
    model: &'a str,
    task: &'a str,
    inputs: &'a str,
    parameters: HfParameters,
}

#[derive(Serialize)]
struct HfParameters {
    max_new_tokens: u32,
}

impl HfSeq2SeqProvider {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_none() {
            return Err(LlmError::MissingApiKey("hf-seq2seq"));
        }
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TextGenerator for HfSeq2SeqProvider {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey("hf-seq2seq"))?;
        let url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://router.huggingface.co/hf-inference");

        let request = HfSeq2SeqRequest {
            model: &self.config.model,
            task: "summarization",
            inputs: prompt,
            parameters: HfParameters {
                max_new_tokens: self.config.max_new_tokens.unwrap_or(DEFAULT_MAX_NEW_TOKENS),
            },
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Http(format!("{}", e)))?;

        let value = read_json(response).await?;
        Ok(extract_generated_text(&value))
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Hugging Face Seq2Seq",
            model: self.config.model.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Plain-text endpoint
// ---------------------------------------------------------------------------

pub struct PlainTextProvider {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct PlainTextRequest<'a> {
    text: &'a str,
}

impl PlainTextProvider {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.base_url.is_none() {
            return Err(LlmError::Config(
                "plain-text provider requires --base-url".to_string(),
            ));
        }
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TextGenerator for PlainTextProvider {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let url = self
            .config
            .base_url
            .as_deref()
            .ok_or_else(|| LlmError::Config("plain-text provider requires a base URL".into()))?;

        let mut request = self.client.post(url).json(&PlainTextRequest { text: prompt });
        if let Some(api_key) = self.config.api_key.as_deref() {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Http(format!("{}", e)))?;

        let value = read_json(response).await?;
        Ok(extract_plain_text(&value))
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Plain Text",
            model: self.config.model.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat-completion endpoint (OpenAI-compatible)
// ---------------------------------------------------------------------------

pub struct OpenAiChatProvider {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl OpenAiChatProvider {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_none() {
            return Err(LlmError::MissingApiKey("openai"));
        }
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatProvider {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey("openai"))?;
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com/v1");
        let url = format!("{}/chat/completions", base_url);

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_new_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Http(format!("{}", e)))?;

        let value = read_json(response).await?;
        Ok(extract_chat_text(&value))
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "OpenAI Chat",
            model: self.config.model.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Gemini generateContent endpoint
// ---------------------------------------------------------------------------

pub struct GeminiProvider {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

impl GeminiProvider {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_none() {
            return Err(LlmError::MissingApiKey("gemini"));
        }
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey("gemini"))?;
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://generativelanguage.googleapis.com/v1beta");
        let url = format!("{}/models/{}:generateContent", base_url, self.config.model);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Http(format!("{}", e)))?;

        let value = read_json(response).await?;
        Ok(extract_gemini_text(&value))
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Gemini",
            model: self.config.model.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stub provider - testing only
// ---------------------------------------------------------------------------

/// Deterministic provider for tests. `response: None` simulates a
/// successful call whose body carries no extractable text.
pub struct StubProvider {
    config: LlmConfig,
    response: Option<String>,
}

impl StubProvider {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            response: Some("Stub summary of the provided files.".to_string()),
        }
    }

    pub fn with_response(config: LlmConfig, response: Option<String>) -> Self {
        Self { config, response }
    }
}

#[async_trait]
impl TextGenerator for StubProvider {
    async fn generate(&self, _prompt: &str) -> Result<Option<String>, LlmError> {
        Ok(self.response.clone())
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Stub",
            model: self.config.model.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider based on configuration.
    pub fn create(config: LlmConfig) -> Result<Box<dyn TextGenerator>, LlmError> {
        match config.provider {
            ProviderKind::HfInference => Ok(Box::new(HfInferenceProvider::new(config)?)),
            ProviderKind::HfSeq2Seq => Ok(Box::new(HfSeq2SeqProvider::new(config)?)),
            ProviderKind::PlainText => Ok(Box::new(PlainTextProvider::new(config)?)),
            ProviderKind::OpenAiChat => Ok(Box::new(OpenAiChatProvider::new(config)?)),
            ProviderKind::Gemini => Ok(Box::new(GeminiProvider::new(config)?)),
            ProviderKind::Stub => {
                let allow_stub = std::env::var("ORDERDESK_ALLOW_STUB_PROVIDER")
                    .map(|v| v == "1" || v == "true")
                    .unwrap_or(false)
                    || cfg!(test);

                if !allow_stub {
                    return Err(LlmError::Config(
                        "stub provider is for testing only; set ORDERDESK_ALLOW_STUB_PROVIDER=1 to enable"
                            .to_string(),
                    ));
                }
                Ok(Box::new(StubProvider::new(config)))
            }
        }
    }
}
