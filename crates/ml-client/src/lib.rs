pub mod chat;
pub mod error;
pub mod provider;

pub use chat::ChatClient;
pub use error::{MLError, MLResult};
pub use provider::ChatModel;

use std::time::Duration;

pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

/// Configuration for the OpenAI-compatible chat endpoint
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Full URL of the chat completions route
    pub endpoint: String,
    /// Bearer credential; requests are refused locally when absent
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://ai.gateway.lovable.dev/v1/chat/completions".to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}
