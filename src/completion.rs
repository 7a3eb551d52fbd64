use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Sampling fields left as `None` are omitted so the service defaults apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    fn backend_name(&self) -> &'static str;
    /// Returns the generated text, or an empty string when the service sent none.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

pub fn completion_text_from_payload(payload: serde_json::Value) -> Result<String> {
    let response = serde_json::from_value::<CompletionResponse>(payload)
        .context("chat completion payload did not match the expected shape")?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .context("chat completion payload has no choices")?;
    Ok(choice.message.content.unwrap_or_default())
}

#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiChatClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChatClient {
    fn backend_name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model = %request.model, turns = request.messages.len(), "chat completion request");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .context("failed to reach chat completion service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "chat completion service returned {}: {}",
                status,
                body.trim()
            ));
        }

        let payload = response
            .json::<serde_json::Value>()
            .await
            .context("failed to decode chat completion response")?;
        completion_text_from_payload(payload)
    }
}
