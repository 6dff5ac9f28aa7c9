use crate::domain::{Conversation, ConversationId, Message, MessageId, UserId};
use async_trait::async_trait;

use super::RepositoryError;

/// Persistence for conversations and their message rows.
///
/// Implementations order messages by creation time, breaking ties by
/// insertion order.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create_conversation(&self, conversation: &Conversation)
    -> Result<(), RepositoryError>;

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// Conversations owned by `user_id`, most recently updated first.
    async fn list_conversations(&self, user_id: UserId)
    -> Result<Vec<Conversation>, RepositoryError>;

    /// Persists the title and `updated_at` of an existing conversation.
    async fn update_conversation(&self, conversation: &Conversation)
    -> Result<(), RepositoryError>;

    /// Removes the conversation and all of its messages. Returns `false` when
    /// nothing was deleted.
    async fn delete_conversation(&self, id: ConversationId) -> Result<bool, RepositoryError>;

    /// Inserts the message, or overwrites the row with the same id, and bumps
    /// the owning conversation's `updated_at`.
    async fn save_message(&self, message: &Message) -> Result<(), RepositoryError>;

    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;

    async fn get_active_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// Every assistant reply linked to `user_message_id`, superseded ones included.
    async fn get_replies(&self, user_message_id: MessageId)
    -> Result<Vec<Message>, RepositoryError>;

    async fn find_active_reply(
        &self,
        user_message_id: MessageId,
    ) -> Result<Option<Message>, RepositoryError>;

    /// Stores `replacement` and the already-superseded `previous` reply in a
    /// single transaction.
    async fn replace_reply(
        &self,
        previous: &Message,
        replacement: &Message,
    ) -> Result<(), RepositoryError>;
}
