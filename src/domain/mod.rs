mod conversation;
mod conversation_id;
mod message;
mod message_id;
mod message_role;
mod user_id;

pub use conversation::{Conversation, DEFAULT_TITLE, MAX_TITLE_LENGTH, auto_title};
pub use conversation_id::ConversationId;
pub use message::{Message, MessageStateError};
pub use message_id::MessageId;
pub use message_role::MessageRole;
pub use user_id::UserId;
