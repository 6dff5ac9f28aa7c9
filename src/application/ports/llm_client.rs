use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{Message, MessageRole};

/// One role/content pair sent to the completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModerationVerdict {
    pub flagged: bool,
    /// Categories reported as violated; empty unless flagged.
    pub categories: BTreeMap<String, bool>,
}

impl ModerationVerdict {
    pub fn allowed() -> Self {
        Self::default()
    }

    pub fn flagged_categories(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|(_, violated)| **violated)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, model: &str, turns: &[ChatTurn]) -> Result<String, LlmClientError>;

    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
