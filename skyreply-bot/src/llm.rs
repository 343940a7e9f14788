//! OpenAI chat-completions client.
//!
//! One endpoint, no streaming, no tools — the bot only ever asks for a
//! single short completion per mention.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A role-tagged message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// The completion backend seam. The production impl is [`LlmClient`];
/// tests substitute fakes.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a conversation, get the generated text back.
    async fn chat(&self, messages: &[ChatMessage], max_tokens: u32) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI API client.
pub struct LlmClient {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "gpt-3.5-turbo".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn chat(&self, messages: &[ChatMessage], max_tokens: u32) -> Result<String> {
        let body = serde_json::json!({
            "model": &self.model,
            "messages": messages,
            "max_tokens": max_tokens,
        });

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to call completion API")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Completion API error {status}: {body}");
        }

        let parsed: ApiResponse = resp
            .json()
            .await
            .context("Failed to parse completion response")?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        Ok(text)
    }
}
