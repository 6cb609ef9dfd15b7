//! Text-inference surface.
//!
//! A single request/response capability: prompt in, generated text out.
//! The production client speaks the OpenAI-compatible chat-completions
//! protocol, which covers both local Ollama and hosted endpoints.

use crate::error::InferenceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The abstract text-inference capability.
#[async_trait]
pub trait TextInference: Send + Sync {
    /// Send a prompt, return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError>;
}

/// Settings for the inference client.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Base URL of an OpenAI-compatible API (e.g. `http://localhost:11434/v1`).
    pub base_url: String,
    /// Bearer token, if the endpoint requires one.
    pub api_key: Option<String>,
    pub model: String,
    /// Low temperature keeps assessments as reproducible as the model allows.
    pub temperature: f32,
    /// Bounded output size.
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            model: "llama3.2:latest".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
            timeout_seconds: 60,
        }
    }
}

/// Chat-completions API request.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat-completions API response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
pub struct HttpInference {
    config: InferenceConfig,
    http: reqwest::Client,
}

impl HttpInference {
    pub fn new(config: InferenceConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, http }
    }
}

#[async_trait]
impl TextInference for HttpInference {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        };

        let mut builder = self.http.post(&url).json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout(self.config.timeout_seconds)
            } else if e.is_connect() {
                InferenceError::Transport(format!(
                    "cannot connect to inference service at {}",
                    self.config.base_url
                ))
            } else {
                InferenceError::Transport(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status { status, body });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Transport(format!("malformed inference response: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}
