mod conversation_repository;
mod llm_client;
mod repository_error;

pub use conversation_repository::ConversationRepository;
pub use llm_client::{ChatTurn, LlmClient, LlmClientError, ModerationVerdict};
pub use repository_error::RepositoryError;
