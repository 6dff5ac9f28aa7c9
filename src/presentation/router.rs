use axum::Router;
use axum::middleware;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::LlmClient;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    create_conversation_handler, delete_conversation_handler, edit_message_handler,
    get_conversation_handler, health_handler, list_conversations_handler,
    regenerate_reply_handler, rename_conversation_handler, reply_history_handler,
    send_message_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<L>(state: AppState<L>) -> Router
where
    L: LlmClient + ?Sized + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler::<L>))
        .route(
            "/api/v1/conversations",
            get(list_conversations_handler::<L>).post(create_conversation_handler::<L>),
        )
        .route(
            "/api/v1/conversations/{conversation_id}",
            get(get_conversation_handler::<L>)
                .patch(rename_conversation_handler::<L>)
                .delete(delete_conversation_handler::<L>),
        )
        .route(
            "/api/v1/conversations/{conversation_id}/messages",
            post(send_message_handler::<L>),
        )
        .route(
            "/api/v1/conversations/{conversation_id}/regenerate",
            post(regenerate_reply_handler::<L>),
        )
        .route(
            "/api/v1/messages/{message_id}",
            patch(edit_message_handler::<L>),
        )
        .route(
            "/api/v1/messages/{message_id}/replies",
            get(reply_history_handler::<L>),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
