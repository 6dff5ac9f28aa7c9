use async_trait::async_trait;

use crate::application::ports::{ChatTurn, LlmClient, LlmClientError, ModerationVerdict};
use crate::domain::MessageRole;

/// Offline stand-in for the completion API. Echoes the latest user turn and
/// never flags anything.
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, model: &str, turns: &[ChatTurn]) -> Result<String, LlmClientError> {
        let prompt = turns
            .iter()
            .rev()
            .find(|t| t.role == MessageRole::User)
            .map(|t| t.content.as_str())
            .unwrap_or_default();

        Ok(format!("[{}] Echo: {}", model, prompt))
    }

    async fn moderate(&self, _text: &str) -> Result<ModerationVerdict, LlmClientError> {
        Ok(ModerationVerdict::allowed())
    }
}
