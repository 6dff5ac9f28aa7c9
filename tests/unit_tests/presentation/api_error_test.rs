use axum::http::StatusCode;
use axum::response::IntoResponse;

use akashchat::application::ports::{LlmClientError, RepositoryError};
use akashchat::application::services::ChatError;
use akashchat::presentation::handlers::ApiError;

fn status_of(error: ChatError) -> StatusCode {
    ApiError::from(error).status
}

#[test]
fn given_client_mistakes_when_mapping_then_bad_request() {
    assert_eq!(status_of(ChatError::EmptyContent), StatusCode::BAD_REQUEST);
    assert_eq!(status_of(ChatError::EmptyTitle), StatusCode::BAD_REQUEST);
    assert_eq!(status_of(ChatError::TitleTooLong(255)), StatusCode::BAD_REQUEST);
    assert_eq!(
        status_of(ChatError::InvalidEditTarget("no".to_string())),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn given_lookup_failures_when_mapping_then_not_found_or_forbidden() {
    assert_eq!(
        status_of(ChatError::ConversationNotFound),
        StatusCode::NOT_FOUND
    );
    assert_eq!(status_of(ChatError::MessageNotFound), StatusCode::NOT_FOUND);
    assert_eq!(status_of(ChatError::Forbidden), StatusCode::FORBIDDEN);
}

#[test]
fn given_moderation_rejection_when_mapping_then_unprocessable_and_not_retryable() {
    let error = ApiError::from(ChatError::ModerationRejected {
        categories: vec!["hate".to_string()],
    });

    assert_eq!(error.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!error.retryable);
}

#[test]
fn given_upstream_failure_when_mapping_then_bad_gateway_and_retryable() {
    let error = ApiError::from(ChatError::Upstream(LlmClientError::ApiRequestFailed(
        "HTTP 500: secret details".to_string(),
    )));

    assert_eq!(error.status, StatusCode::BAD_GATEWAY);
    assert!(error.retryable);
    assert!(!error.message.contains("secret details"));
}

#[test]
fn given_repository_failure_when_mapping_then_internal_error_hides_cause() {
    let error = ApiError::from(ChatError::Repository(RepositoryError::QueryFailed(
        "relation messages does not exist".to_string(),
    )));

    assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error.message, "Internal server error");
}

#[tokio::test]
async fn given_api_error_when_rendered_then_body_carries_error_and_retryable() {
    let response = ApiError::from(ChatError::Upstream(LlmClientError::RateLimited)).into_response();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["retryable"], true);
    assert!(json["error"].as_str().is_some());
}
