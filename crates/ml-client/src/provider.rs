use async_trait::async_trait;

use crate::error::MLResult;

/// Backend-agnostic interface for text completion.
///
/// Implemented by the HTTP [`ChatClient`](crate::ChatClient); tests provide
/// scripted stand-ins.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the raw reply text for one system + user exchange.
    async fn complete(&self, system: Option<&str>, user: &str) -> MLResult<String>;

    fn backend_name(&self) -> &'static str;
}
