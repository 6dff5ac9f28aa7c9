mod conversations;
mod current_user;
mod dto;
mod error;
mod health;
mod messages;

pub use conversations::{
    create_conversation_handler, delete_conversation_handler, get_conversation_handler,
    list_conversations_handler, rename_conversation_handler,
};
pub use current_user::{CurrentUser, USER_ID_HEADER};
pub use dto::{
    ConversationDetailResponse, ConversationResponse, CreateConversationRequest,
    CreateConversationResponse, EditMessageRequest, ExchangeResponse, MessageResponse,
    RegenerateReplyRequest, RegenerationResponse, RenameConversationRequest, SendMessageRequest,
};
pub use error::{ApiError, ErrorResponse};
pub use health::health_handler;
pub use messages::{
    edit_message_handler, regenerate_reply_handler, reply_history_handler, send_message_handler,
};
