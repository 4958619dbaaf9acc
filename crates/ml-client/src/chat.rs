use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{MLError, MLResult};
use crate::provider::ChatModel;
use crate::LlmConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
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

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a message list and return `choices[0].message.content`
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> MLResult<String> {
        let api_key = self.config.api_key.as_deref().ok_or(MLError::NotConfigured)?;

        let request = ChatRequest {
            model: &self.config.model,
            messages,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(MLError::from_transport)?;

        if !response.status().is_success() {
            return Err(MLError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(MLError::from_transport)?;
        let completion: ChatCompletion = serde_json::from_str(&body)?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| MLError::InvalidResponse("completion has no content".to_string()))?;

        tracing::debug!("Model {} replied with {} chars", self.config.model, content.len());
        Ok(content)
    }
}

#[async_trait]
impl ChatModel for ChatClient {
    async fn complete(&self, system: Option<&str>, user: &str) -> MLResult<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(user));
        self.chat(messages).await
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
