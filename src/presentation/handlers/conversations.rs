use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::ports::LlmClient;
use crate::presentation::state::AppState;

use super::dto::{
    ConversationDetailResponse, ConversationResponse, CreateConversationRequest,
    CreateConversationResponse, MessageResponse, RenameConversationRequest, parse_conversation_id,
};
use super::{ApiError, CurrentUser};

#[tracing::instrument(skip(state))]
pub async fn list_conversations_handler<L>(
    State(state): State<AppState<L>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Response, ApiError>
where
    L: LlmClient + ?Sized + 'static,
{
    let conversations = state.chat_service.list_conversations(user_id).await?;
    let body: Vec<ConversationResponse> =
        conversations.iter().map(ConversationResponse::from).collect();

    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Creates a conversation. A non-empty `content` in the body is sent as the
/// first message in the same request; if that message fails, no conversation
/// is left behind.
#[tracing::instrument(skip(state, body))]
pub async fn create_conversation_handler<L>(
    State(state): State<AppState<L>>,
    CurrentUser(user_id): CurrentUser,
    body: Bytes,
) -> Result<Response, ApiError>
where
    L: LlmClient + ?Sized + 'static,
{
    let request: CreateConversationRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateConversationRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?
    };

    let first_message = request
        .content
        .as_deref()
        .map(str::trim)
        .filter(|content| !content.is_empty());

    let response = match first_message {
        Some(content) => {
            let exchange = state
                .chat_service
                .start_conversation_with(user_id, content)
                .await?;
            CreateConversationResponse {
                conversation: ConversationResponse::from(&exchange.conversation),
                user_message: Some(MessageResponse::from(&exchange.user_message)),
                assistant_message: Some(MessageResponse::from(&exchange.assistant_message)),
            }
        }
        None => {
            let conversation = state.chat_service.start_conversation(user_id).await?;
            CreateConversationResponse {
                conversation: ConversationResponse::from(&conversation),
                user_message: None,
                assistant_message: None,
            }
        }
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[tracing::instrument(skip(state))]
pub async fn get_conversation_handler<L>(
    State(state): State<AppState<L>>,
    CurrentUser(user_id): CurrentUser,
    Path(conversation_id): Path<String>,
) -> Result<Response, ApiError>
where
    L: LlmClient + ?Sized + 'static,
{
    let conversation_id = parse_conversation_id(&conversation_id)?;

    let conversation = state
        .chat_service
        .get_conversation(user_id, conversation_id)
        .await?;
    let transcript = state
        .chat_service
        .get_active_transcript(user_id, conversation_id)
        .await?;

    let response = ConversationDetailResponse {
        conversation: ConversationResponse::from(&conversation),
        messages: transcript.iter().map(MessageResponse::from).collect(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[tracing::instrument(skip(state, request))]
pub async fn rename_conversation_handler<L>(
    State(state): State<AppState<L>>,
    CurrentUser(user_id): CurrentUser,
    Path(conversation_id): Path<String>,
    Json(request): Json<RenameConversationRequest>,
) -> Result<Response, ApiError>
where
    L: LlmClient + ?Sized + 'static,
{
    let conversation_id = parse_conversation_id(&conversation_id)?;

    let conversation = state
        .chat_service
        .rename_conversation(user_id, conversation_id, &request.title)
        .await?;

    Ok((StatusCode::OK, Json(ConversationResponse::from(&conversation))).into_response())
}

#[tracing::instrument(skip(state))]
pub async fn delete_conversation_handler<L>(
    State(state): State<AppState<L>>,
    CurrentUser(user_id): CurrentUser,
    Path(conversation_id): Path<String>,
) -> Result<Response, ApiError>
where
    L: LlmClient + ?Sized + 'static,
{
    let conversation_id = parse_conversation_id(&conversation_id)?;

    state
        .chat_service
        .delete_conversation(user_id, conversation_id)
        .await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
