use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::{Exchange, Regeneration};
use crate::domain::{Conversation, ConversationId, Message, MessageId};

use super::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct CreateConversationRequest {
    /// First user message; when present it is sent right away.
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct EditMessageRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameConversationRequest {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateReplyRequest {
    pub message_id: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Conversation> for ConversationResponse {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id.to_string(),
            title: conversation.title.clone(),
            created_at: conversation.created_at.to_rfc3339(),
            updated_at: conversation.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub role: &'static str,
    pub content: String,
    pub created_at: String,
    pub edited: bool,
    pub edited_at: Option<String>,
    pub previous_content: Option<String>,
    pub superseded: bool,
    pub replaced_by: Option<String>,
    pub parent_user_message: Option<String>,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.to_string(),
            role: message.role.as_str(),
            content: message.content.clone(),
            created_at: message.created_at.to_rfc3339(),
            edited: message.edited,
            edited_at: message.edited_at.map(|t| t.to_rfc3339()),
            previous_content: message.previous_content.clone(),
            superseded: message.superseded,
            replaced_by: message.replaced_by.map(|id| id.to_string()),
            parent_user_message: message.parent_user_message.map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationDetailResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
    pub conversation: ConversationResponse,
    pub user_message: MessageResponse,
    pub assistant_message: MessageResponse,
}

impl From<&Exchange> for ExchangeResponse {
    fn from(exchange: &Exchange) -> Self {
        Self {
            conversation: ConversationResponse::from(&exchange.conversation),
            user_message: MessageResponse::from(&exchange.user_message),
            assistant_message: MessageResponse::from(&exchange.assistant_message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateConversationResponse {
    pub conversation: ConversationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<MessageResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_message: Option<MessageResponse>,
}

#[derive(Debug, Serialize)]
pub struct RegenerationResponse {
    pub assistant_message: MessageResponse,
    pub superseded_message_id: String,
}

impl From<&Regeneration> for RegenerationResponse {
    fn from(regeneration: &Regeneration) -> Self {
        Self {
            assistant_message: MessageResponse::from(&regeneration.reply),
            superseded_message_id: regeneration.superseded.id.to_string(),
        }
    }
}

pub(super) fn parse_conversation_id(raw: &str) -> Result<ConversationId, ApiError> {
    Uuid::parse_str(raw)
        .map(ConversationId::from_uuid)
        .map_err(|_| ApiError::bad_request(format!("Invalid conversation ID: {}", raw)))
}

pub(super) fn parse_message_id(raw: &str) -> Result<MessageId, ApiError> {
    Uuid::parse_str(raw)
        .map(MessageId::from_uuid)
        .map_err(|_| ApiError::bad_request(format!("Invalid message ID: {}", raw)))
}
