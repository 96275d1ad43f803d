//! Chat-completions backend
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (Groq by
//! default) and exposes it as an [`Explainer`].

use std::time::Duration;

use async_trait::async_trait;
use finspeak_config::GenerativeConfig;
use finspeak_core::{Explainer, Explanation, ExplanationSource, Language};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::prompt::{explanation_messages, Message};
use crate::LlmError;

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Base URL, without `/chat/completions`
    pub endpoint: String,
    /// Bearer token; requests are not attempted without one
    pub api_key: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Initial backoff, doubled each retry
    pub initial_backoff: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::from(&GenerativeConfig::default())
    }
}

impl From<&GenerativeConfig> for LlmConfig {
    fn from(config: &GenerativeConfig) -> Self {
        Self {
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(200),
        }
    }
}

/// Generative explainer over a chat-completions API
#[derive(Clone)]
pub struct ChatCompletionsExplainer {
    client: Client,
    config: LlmConfig,
}

impl ChatCompletionsExplainer {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint)
    }

    fn build_request(&self, messages: &[Message]) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: messages.iter().map(ChatMessage::from).collect(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    async fn execute_request(&self, api_key: &str, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            // 5xx and 429 are retryable, other 4xx are not
            if status.is_server_error() || status.as_u16() == 429 {
                return Err(LlmError::Network(format!("Server error {}: {}", status, error)));
            }
            return Err(LlmError::Api(format!("{}: {}", status, error)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        extract_content(body)
    }

    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_) | LlmError::Timeout)
    }

    /// Send the chat request with retry and exponential backoff
    pub async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Configuration("API key not set".to_string()))?;
        let request = self.build_request(messages);

        let mut last_error = None;
        let mut backoff = self.config.initial_backoff;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    "LLM request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    self.config.max_retries
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(api_key, &request).await {
                Ok(text) => return Ok(text),
                Err(e) if Self::is_retryable(&e) => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Network("Max retries exceeded".to_string())))
    }
}

#[async_trait]
impl Explainer for ChatCompletionsExplainer {
    async fn explain(&self, term: &str, language: Language) -> finspeak_core::Result<Explanation> {
        let start = std::time::Instant::now();
        let text = self.complete(&explanation_messages(term, language)).await?;

        tracing::debug!(
            model = %self.config.model,
            term,
            language = language.code(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Generated explanation"
        );

        Ok(Explanation {
            term: term.trim().to_lowercase(),
            text,
            source: ExplanationSource::Ai,
        })
    }

    fn name(&self) -> &str {
        &self.config.model
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }
}

impl std::fmt::Debug for ChatCompletionsExplainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsExplainer")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .field("has_api_key", &self.config.api_key.is_some())
            .finish()
    }
}

fn extract_content(body: ChatResponse) -> Result<String, LlmError> {
    let text = body
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;
    if text.is_empty() {
        return Err(LlmError::InvalidResponse("Empty completion".to_string()));
    }
    Ok(text)
}

// Chat-completions API types
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.to_string(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
