mod chat_service;
mod history_trimmer;

pub use chat_service::{ChatError, ChatService, Exchange, Regeneration};
pub use history_trimmer::{
    DEFAULT_MESSAGE_LIMIT, DEFAULT_TOKEN_BUDGET, HistoryTrimmer, estimate_tokens,
};
