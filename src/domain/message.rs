use chrono::{DateTime, Utc};

use super::{ConversationId, MessageId, MessageRole};

/// A single turn of a conversation.
///
/// Rows are never deleted on their own. A user message is edited in place
/// (`previous_content` keeps the prior text); an assistant reply is archived by
/// setting `superseded` and pointing `replaced_by` at its successor.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub previous_content: Option<String>,
    pub superseded: bool,
    pub replaced_by: Option<MessageId>,
    pub parent_user_message: Option<MessageId>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageStateError {
    #[error("only user messages can be edited")]
    NotAUserMessage,
    #[error("only assistant replies can be superseded")]
    NotAnAssistantReply,
    #[error("message is superseded and can no longer change")]
    Superseded,
}

impl Message {
    pub fn new(conversation_id: ConversationId, role: MessageRole, content: String) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role,
            content,
            created_at: Utc::now(),
            edited: false,
            edited_at: None,
            previous_content: None,
            superseded: false,
            replaced_by: None,
            parent_user_message: None,
        }
    }

    pub fn user(conversation_id: ConversationId, content: String) -> Self {
        Self::new(conversation_id, MessageRole::User, content)
    }

    pub fn assistant_reply(
        conversation_id: ConversationId,
        parent_user_message: MessageId,
        content: String,
    ) -> Self {
        Self {
            parent_user_message: Some(parent_user_message),
            ..Self::new(conversation_id, MessageRole::Assistant, content)
        }
    }

    pub fn is_active(&self) -> bool {
        !self.superseded
    }

    /// Only active user messages accept edits.
    pub fn ensure_editable(&self) -> Result<(), MessageStateError> {
        if self.role != MessageRole::User {
            return Err(MessageStateError::NotAUserMessage);
        }
        if self.superseded {
            return Err(MessageStateError::Superseded);
        }
        Ok(())
    }

    pub fn edit_content(&mut self, new_content: String) -> Result<(), MessageStateError> {
        self.ensure_editable()?;

        self.previous_content = Some(std::mem::replace(&mut self.content, new_content));
        self.edited = true;
        self.edited_at = Some(Utc::now());
        Ok(())
    }

    pub fn supersede_with(&mut self, replacement: MessageId) -> Result<(), MessageStateError> {
        if self.role != MessageRole::Assistant {
            return Err(MessageStateError::NotAnAssistantReply);
        }
        if self.superseded {
            return Err(MessageStateError::Superseded);
        }

        self.superseded = true;
        self.replaced_by = Some(replacement);
        Ok(())
    }
}
