use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::application::ports::{
    ChatTurn, ConversationRepository, LlmClient, LlmClientError, RepositoryError,
};
use crate::domain::{
    Conversation, ConversationId, MAX_TITLE_LENGTH, Message, MessageId, MessageRole, UserId,
};

use super::HistoryTrimmer;

/// Conversation bookkeeping in front of the completion API.
///
/// Every operation is scoped to the calling user: conversations owned by
/// someone else are reported as missing.
pub struct ChatService<L>
where
    L: LlmClient + ?Sized,
{
    repository: Arc<dyn ConversationRepository>,
    llm_client: Arc<L>,
    trimmer: HistoryTrimmer,
    model: String,
}

impl<L> ChatService<L>
where
    L: LlmClient + ?Sized,
{
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        llm_client: Arc<L>,
        trimmer: HistoryTrimmer,
        model: String,
    ) -> Self {
        Self {
            repository,
            llm_client,
            trimmer,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self), fields(user_id = %owner))]
    pub async fn start_conversation(&self, owner: UserId) -> Result<Conversation, ChatError> {
        let conversation = Conversation::new(owner);
        self.repository.create_conversation(&conversation).await?;

        info!(conversation_id = %conversation.id, "Conversation created");
        Ok(conversation)
    }

    /// Opens a conversation with its first message in one step.
    ///
    /// Content and moderation are checked before anything is stored, and a
    /// failed completion removes the new conversation again.
    #[instrument(skip(self, text), fields(user_id = %owner))]
    pub async fn start_conversation_with(
        &self,
        owner: UserId,
        text: &str,
    ) -> Result<Exchange, ChatError> {
        let content = normalize_content(text)?;
        self.ensure_allowed(&content).await?;

        let conversation = self.start_conversation(owner).await?;
        let conversation_id = conversation.id;

        match self.append_exchange(conversation, content).await {
            Ok(exchange) => Ok(exchange),
            Err(e) => {
                if let Err(cleanup) = self.repository.delete_conversation(conversation_id).await {
                    warn!(
                        conversation_id = %conversation_id,
                        error = %cleanup,
                        "Failed to remove conversation after first message failed"
                    );
                }
                Err(e)
            }
        }
    }

    #[instrument(skip(self), fields(user_id = %owner))]
    pub async fn list_conversations(&self, owner: UserId) -> Result<Vec<Conversation>, ChatError> {
        Ok(self.repository.list_conversations(owner).await?)
    }

    pub async fn get_conversation(
        &self,
        owner: UserId,
        conversation_id: ConversationId,
    ) -> Result<Conversation, ChatError> {
        self.repository
            .get_conversation(conversation_id)
            .await?
            .filter(|c| c.is_owned_by(owner))
            .ok_or(ChatError::ConversationNotFound)
    }

    #[instrument(skip(self, title), fields(user_id = %owner, conversation_id = %conversation_id))]
    pub async fn rename_conversation(
        &self,
        owner: UserId,
        conversation_id: ConversationId,
        title: &str,
    ) -> Result<Conversation, ChatError> {
        let mut conversation = self.get_conversation(owner, conversation_id).await?;

        let title = title.trim();
        if title.is_empty() {
            return Err(ChatError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ChatError::TitleTooLong(MAX_TITLE_LENGTH));
        }

        conversation.rename(title.to_string());
        self.repository.update_conversation(&conversation).await?;

        Ok(conversation)
    }

    #[instrument(skip(self), fields(user_id = %owner, conversation_id = %conversation_id))]
    pub async fn delete_conversation(
        &self,
        owner: UserId,
        conversation_id: ConversationId,
    ) -> Result<(), ChatError> {
        let conversation = self.get_conversation(owner, conversation_id).await?;

        if !self.repository.delete_conversation(conversation.id).await? {
            return Err(ChatError::ConversationNotFound);
        }

        info!("Conversation deleted");
        Ok(())
    }

    /// Active messages of the conversation in creation order.
    pub async fn get_active_transcript(
        &self,
        owner: UserId,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ChatError> {
        let conversation = self.get_conversation(owner, conversation_id).await?;
        Ok(self.repository.get_active_messages(conversation.id).await?)
    }

    /// Loads a message through its conversation's ownership.
    pub async fn get_message(
        &self,
        owner: UserId,
        message_id: MessageId,
    ) -> Result<Message, ChatError> {
        let message = self
            .repository
            .get_message(message_id)
            .await?
            .ok_or(ChatError::MessageNotFound)?;

        let conversation = self
            .repository
            .get_conversation(message.conversation_id)
            .await?
            .ok_or(ChatError::MessageNotFound)?;

        if !conversation.is_owned_by(owner) {
            return Err(ChatError::Forbidden);
        }

        Ok(message)
    }

    /// Appends a user message and the assistant's reply to it.
    ///
    /// A moderation hit persists nothing. An upstream failure leaves the user
    /// message in place without a reply.
    #[instrument(skip(self, text), fields(user_id = %owner, conversation_id = %conversation_id))]
    pub async fn send_message(
        &self,
        owner: UserId,
        conversation_id: ConversationId,
        text: &str,
    ) -> Result<Exchange, ChatError> {
        let content = normalize_content(text)?;
        let conversation = self.get_conversation(owner, conversation_id).await?;

        self.ensure_allowed(&content).await?;

        self.append_exchange(conversation, content).await
    }

    async fn append_exchange(
        &self,
        mut conversation: Conversation,
        content: String,
    ) -> Result<Exchange, ChatError> {
        let user_message = Message::user(conversation.id, content);
        self.repository.save_message(&user_message).await?;

        let transcript = self.repository.get_active_messages(conversation.id).await?;
        self.refresh_title(&mut conversation, &transcript).await?;

        let answer = self.complete(&transcript).await?;
        let assistant_message = Message::assistant_reply(conversation.id, user_message.id, answer);
        self.repository.save_message(&assistant_message).await?;

        info!(
            user_message_id = %user_message.id,
            assistant_message_id = %assistant_message.id,
            "Message exchange stored"
        );

        let conversation = self
            .repository
            .get_conversation(conversation.id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        Ok(Exchange {
            conversation,
            user_message,
            assistant_message,
        })
    }

    /// Rewrites an active user message in place, keeping the prior text.
    #[instrument(skip(self, text), fields(user_id = %owner, message_id = %message_id))]
    pub async fn edit_message(
        &self,
        owner: UserId,
        message_id: MessageId,
        text: &str,
    ) -> Result<Message, ChatError> {
        let mut message = self.get_message(owner, message_id).await?;
        message
            .ensure_editable()
            .map_err(|e| ChatError::InvalidEditTarget(e.to_string()))?;

        let content = normalize_content(text)?;
        message
            .edit_content(content)
            .map_err(|e| ChatError::InvalidEditTarget(e.to_string()))?;
        self.repository.save_message(&message).await?;

        info!("Message edited");
        Ok(message)
    }

    /// Replaces the active reply to `user_message_id` with a fresh completion.
    ///
    /// Only the currently active reply is superseded; older links of the
    /// `replaced_by` chain are left alone. On any failure nothing changes.
    #[instrument(
        skip(self),
        fields(user_id = %owner, conversation_id = %conversation_id, message_id = %user_message_id)
    )]
    pub async fn regenerate_reply(
        &self,
        owner: UserId,
        conversation_id: ConversationId,
        user_message_id: MessageId,
    ) -> Result<Regeneration, ChatError> {
        let conversation = self.get_conversation(owner, conversation_id).await?;

        let user_message = self
            .repository
            .get_message(user_message_id)
            .await?
            .filter(|m| m.conversation_id == conversation.id)
            .ok_or(ChatError::MessageNotFound)?;

        if user_message.role != MessageRole::User {
            return Err(ChatError::InvalidEditTarget(
                "replies can only be regenerated for user messages".to_string(),
            ));
        }
        if user_message.superseded {
            return Err(ChatError::InvalidEditTarget(
                "message is superseded and can no longer change".to_string(),
            ));
        }

        let mut previous = self
            .repository
            .find_active_reply(user_message.id)
            .await?
            .ok_or_else(|| {
                ChatError::InvalidEditTarget("message has no reply to regenerate".to_string())
            })?;

        self.ensure_allowed(&user_message.content).await?;

        let transcript = self.repository.get_active_messages(conversation.id).await?;
        let answer = self
            .complete(history_through(&transcript, user_message.id))
            .await?;

        let reply = Message::assistant_reply(conversation.id, user_message.id, answer);
        previous
            .supersede_with(reply.id)
            .map_err(|e| ChatError::InvalidEditTarget(e.to_string()))?;
        self.repository.replace_reply(&previous, &reply).await?;

        info!(
            superseded_id = %previous.id,
            reply_id = %reply.id,
            "Reply regenerated"
        );

        Ok(Regeneration {
            reply,
            superseded: previous,
        })
    }

    /// Every reply generated for a user message, oldest first.
    ///
    /// Given an assistant reply, resolves to the history of the user message it
    /// answers.
    pub async fn reply_history(
        &self,
        owner: UserId,
        message_id: MessageId,
    ) -> Result<Vec<Message>, ChatError> {
        let message = self.get_message(owner, message_id).await?;

        let user_message_id = match message.role {
            MessageRole::User => message.id,
            MessageRole::Assistant => match message.parent_user_message {
                Some(parent) => parent,
                None => return Ok(vec![message]),
            },
        };

        Ok(self.repository.get_replies(user_message_id).await?)
    }

    async fn ensure_allowed(&self, text: &str) -> Result<(), ChatError> {
        match self.llm_client.moderate(text).await {
            Ok(verdict) if verdict.flagged => {
                let categories = verdict.flagged_categories();
                warn!(?categories, "Message flagged by moderation");
                Err(ChatError::ModerationRejected { categories })
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Moderation check failed, allowing message");
                Ok(())
            }
        }
    }

    async fn complete(&self, transcript: &[Message]) -> Result<String, ChatError> {
        let window = self.trimmer.trim(transcript);
        debug!(
            transcript_len = transcript.len(),
            forwarded = window.len(),
            "Trimmed history for completion"
        );

        let turns: Vec<ChatTurn> = window.iter().map(ChatTurn::from).collect();

        self.llm_client
            .complete(&self.model, &turns)
            .await
            .map_err(|e| {
                error!(error = %e, "Completion request failed");
                ChatError::Upstream(e)
            })
    }

    async fn refresh_title(
        &self,
        conversation: &mut Conversation,
        transcript: &[Message],
    ) -> Result<(), RepositoryError> {
        let Some(first_user_message) = transcript.iter().find(|m| m.role == MessageRole::User)
        else {
            return Ok(());
        };

        if conversation.apply_auto_title(&first_user_message.content) {
            self.repository.update_conversation(conversation).await?;
            debug!(title = %conversation.title, "Conversation auto-titled");
        }

        Ok(())
    }
}

/// Active messages up to and including `message_id`.
fn history_through(transcript: &[Message], message_id: MessageId) -> &[Message] {
    match transcript.iter().position(|m| m.id == message_id) {
        Some(index) => &transcript[..=index],
        None => transcript,
    }
}

fn normalize_content(text: &str) -> Result<String, ChatError> {
    let content = text.trim();
    if content.is_empty() {
        return Err(ChatError::EmptyContent);
    }
    Ok(content.to_string())
}

/// A user message together with the reply it produced.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub conversation: Conversation,
    pub user_message: Message,
    pub assistant_message: Message,
}

#[derive(Debug, Clone)]
pub struct Regeneration {
    pub reply: Message,
    pub superseded: Message,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message rejected by moderation")]
    ModerationRejected { categories: Vec<String> },
    #[error("completion failed: {0}")]
    Upstream(LlmClientError),
    #[error("invalid edit target: {0}")]
    InvalidEditTarget(String),
    #[error("message content cannot be empty")]
    EmptyContent,
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("title exceeds {0} characters")]
    TitleTooLong(usize),
    #[error("conversation not found")]
    ConversationNotFound,
    #[error("message not found")]
    MessageNotFound,
    #[error("permission denied")]
    Forbidden,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

impl ChatError {
    /// Whether the same request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatError::Upstream(_))
    }
}
