//! Chat-completion client for summarization.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint over reqwest.
//! One request per summary; no retries, no streaming.

use crate::config::Config;
use crate::summary::{SummaryRequest, SummaryResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Generous ceiling for a completion on a long article
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("API key is missing; set OPENAI_API_KEY or provide a key")]
    MissingCredential,
    #[error("API key was rejected ({status}): {message}")]
    Unauthorized { status: u16, message: String },
    #[error("summarization API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("summarization request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed API response: {0}")]
    Malformed(String),
    #[error("summarization API returned an empty response")]
    EmptyResponse,
}

impl SummarizeError {
    /// Missing or rejected credential
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            SummarizeError::MissingCredential | SummarizeError::Unauthorized { .. }
        )
    }
}

/// Secret token for the chat API
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key. Blank input is no credential at all.
    pub fn new(key: &str) -> Option<Self> {
        let key = key.trim();
        (!key.is_empty()).then(|| Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for an OpenAI-compatible chat endpoint
pub struct ChatClient {
    client: Client,
    base_url: String,
    persona: String,
    temperature: f32,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl ChatClient {
    /// Build a client from the `[api]` and `[agent]` sections
    pub fn from_config(config: &Config) -> Result<Self, SummarizeError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            persona: config.agent.persona.clone(),
            temperature: config.agent.temperature,
        })
    }

    /// Summarize `request` with the given credential
    pub async fn summarize(
        &self,
        request: &SummaryRequest,
        credential: Option<&Credential>,
    ) -> Result<SummaryResult, SummarizeError> {
        let credential = credential.ok_or(SummarizeError::MissingCredential)?;
        let prompt = request.prompt();
        self.complete(credential, &request.model, &prompt).await
    }

    /// Send one system + user exchange and return the first choice
    pub async fn complete(
        &self,
        credential: &Credential,
        model: &str,
        prompt: &str,
    ) -> Result<SummaryResult, SummarizeError> {
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.persona,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
        };

        tracing::info!(model, prompt_chars = prompt.len(), "requesting summary");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            let message = error_message(&raw);
            tracing::warn!(status = status.as_u16(), %message, "summarization API error");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SummarizeError::Unauthorized {
                    status: status.as_u16(),
                    message,
                },
                _ => SummarizeError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&raw).map_err(|e| SummarizeError::Malformed(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(SummarizeError::EmptyResponse)?;

        tracing::debug!(words = text.split_whitespace().count(), "summary received");
        Ok(SummaryResult {
            text,
            model: parsed.model.unwrap_or_else(|| model.to_string()),
        })
    }
}

/// Provider error message, or the raw body when it is not the usual envelope
fn error_message(raw: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(raw) {
        Ok(envelope) => envelope.error.message,
        Err(_) if raw.trim().is_empty() => "no error details".to_string(),
        Err(_) => raw.trim().chars().take(200).collect(),
    }
}
