use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{Conversation, ConversationId, Message, MessageId, MessageRole, UserId};

/// Process-local store used when no database is configured.
///
/// Messages are kept in insertion order, which breaks ties between equal
/// creation timestamps the same way the `seq` column does in Postgres.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    conversations: HashMap<ConversationId, Conversation>,
    messages: Vec<Message>,
}

impl State {
    fn touch(&mut self, conversation_id: ConversationId) -> Result<(), RepositoryError> {
        let conversation = self
            .conversations
            .get_mut(&conversation_id)
            .ok_or_else(|| {
                RepositoryError::ConstraintViolation(format!(
                    "conversation {} does not exist",
                    conversation_id
                ))
            })?;
        conversation.updated_at = Utc::now();
        Ok(())
    }

    fn upsert(&mut self, message: &Message) {
        match self.messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => *existing = message.clone(),
            None => self.messages.push(message.clone()),
        }
    }

    fn sorted(&self, filter: impl Fn(&Message) -> bool) -> Vec<Message> {
        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| filter(*m))
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        messages
    }
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.conversations.contains_key(&conversation.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "conversation {} already exists",
                conversation.id
            )));
        }
        state
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.state.read().await.conversations.get(&id).cloned())
    }

    async fn list_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let state = self.state.read().await;
        let mut conversations: Vec<Conversation> = state
            .conversations
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn update_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let stored = state
            .conversations
            .get_mut(&conversation.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("conversation {}", conversation.id)))?;
        stored.title = conversation.title.clone();
        stored.title_is_custom = conversation.title_is_custom;
        stored.updated_at = conversation.updated_at;
        Ok(())
    }

    async fn delete_conversation(&self, id: ConversationId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        if state.conversations.remove(&id).is_none() {
            return Ok(false);
        }
        state.messages.retain(|m| m.conversation_id != id);
        Ok(true)
    }

    async fn save_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.touch(message.conversation_id)?;
        state.upsert(message);
        Ok(())
    }

    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn get_active_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.sorted(|m| m.conversation_id == conversation_id && m.is_active()))
    }

    async fn get_replies(
        &self,
        user_message_id: MessageId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.sorted(|m| {
            m.role == MessageRole::Assistant && m.parent_user_message == Some(user_message_id)
        }))
    }

    async fn find_active_reply(
        &self,
        user_message_id: MessageId,
    ) -> Result<Option<Message>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .sorted(|m| {
                m.role == MessageRole::Assistant
                    && m.is_active()
                    && m.parent_user_message == Some(user_message_id)
            })
            .pop())
    }

    async fn replace_reply(
        &self,
        previous: &Message,
        replacement: &Message,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.touch(replacement.conversation_id)?;
        state.upsert(replacement);
        state.upsert(previous);
        Ok(())
    }
}
