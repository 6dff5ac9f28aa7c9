use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::ChatError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub retryable: bool,
}

/// Failure of a request, rendered as a JSON body with a matching status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        let status = match &error {
            ChatError::EmptyContent
            | ChatError::EmptyTitle
            | ChatError::TitleTooLong(_)
            | ChatError::InvalidEditTarget(_) => StatusCode::BAD_REQUEST,
            ChatError::Forbidden => StatusCode::FORBIDDEN,
            ChatError::ConversationNotFound | ChatError::MessageNotFound => StatusCode::NOT_FOUND,
            ChatError::ModerationRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ChatError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ChatError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &error {
            ChatError::ModerationRejected { .. } => {
                "Message violates the usage policies, please rephrase it".to_string()
            }
            ChatError::Upstream(_) => {
                "The assistant is unavailable right now, please try again".to_string()
            }
            ChatError::Repository(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %error, status = %status, "Request failed");
        } else {
            tracing::warn!(error = %error, status = %status, "Request rejected");
        }

        Self {
            status,
            message,
            retryable: error.is_retryable(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                retryable: self.retryable,
            }),
        )
            .into_response()
    }
}
