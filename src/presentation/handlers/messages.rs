use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::ports::LlmClient;
use crate::infrastructure::observability::sanitize_content;
use crate::presentation::state::AppState;

use super::dto::{
    EditMessageRequest, ExchangeResponse, MessageResponse, RegenerateReplyRequest,
    RegenerationResponse, SendMessageRequest, parse_conversation_id, parse_message_id,
};
use super::{ApiError, CurrentUser};

#[tracing::instrument(skip(state, request))]
pub async fn send_message_handler<L>(
    State(state): State<AppState<L>>,
    CurrentUser(user_id): CurrentUser,
    Path(conversation_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Response, ApiError>
where
    L: LlmClient + ?Sized + 'static,
{
    let conversation_id = parse_conversation_id(&conversation_id)?;
    tracing::debug!(content = %sanitize_content(&request.content), "Sending message");

    let exchange = state
        .chat_service
        .send_message(user_id, conversation_id, &request.content)
        .await?;

    Ok((StatusCode::CREATED, Json(ExchangeResponse::from(&exchange))).into_response())
}

#[tracing::instrument(skip(state, request))]
pub async fn regenerate_reply_handler<L>(
    State(state): State<AppState<L>>,
    CurrentUser(user_id): CurrentUser,
    Path(conversation_id): Path<String>,
    Json(request): Json<RegenerateReplyRequest>,
) -> Result<Response, ApiError>
where
    L: LlmClient + ?Sized + 'static,
{
    let conversation_id = parse_conversation_id(&conversation_id)?;
    let message_id = parse_message_id(&request.message_id)?;

    let regeneration = state
        .chat_service
        .regenerate_reply(user_id, conversation_id, message_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegenerationResponse::from(&regeneration)),
    )
        .into_response())
}

#[tracing::instrument(skip(state, request))]
pub async fn edit_message_handler<L>(
    State(state): State<AppState<L>>,
    CurrentUser(user_id): CurrentUser,
    Path(message_id): Path<String>,
    Json(request): Json<EditMessageRequest>,
) -> Result<Response, ApiError>
where
    L: LlmClient + ?Sized + 'static,
{
    let message_id = parse_message_id(&message_id)?;
    tracing::debug!(content = %sanitize_content(&request.content), "Editing message");

    let message = state
        .chat_service
        .edit_message(user_id, message_id, &request.content)
        .await?;

    Ok((StatusCode::OK, Json(MessageResponse::from(&message))).into_response())
}

#[tracing::instrument(skip(state))]
pub async fn reply_history_handler<L>(
    State(state): State<AppState<L>>,
    CurrentUser(user_id): CurrentUser,
    Path(message_id): Path<String>,
) -> Result<Response, ApiError>
where
    L: LlmClient + ?Sized + 'static,
{
    let message_id = parse_message_id(&message_id)?;

    let replies = state.chat_service.reply_history(user_id, message_id).await?;
    let body: Vec<MessageResponse> = replies.iter().map(MessageResponse::from).collect();

    Ok((StatusCode::OK, Json(body)).into_response())
}
