use chrono::{DateTime, Utc};

use super::{ConversationId, UserId};

pub const DEFAULT_TITLE: &str = "New Conversation";
pub const MAX_TITLE_LENGTH: usize = 255;

const AUTO_TITLE_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: UserId,
    pub title: String,
    /// Set once the owner renames the conversation; disables auto-titling.
    pub title_is_custom: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            user_id,
            title: DEFAULT_TITLE.to_string(),
            title_is_custom: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    pub fn has_default_title(&self) -> bool {
        !self.title_is_custom && self.title == DEFAULT_TITLE
    }

    pub fn rename(&mut self, title: String) {
        self.title = title;
        self.title_is_custom = true;
        self.touch();
    }

    /// Titles an untouched conversation after its first user message.
    ///
    /// Returns `true` when the title changed. Conversations that were renamed,
    /// or already auto-titled, keep their title.
    pub fn apply_auto_title(&mut self, first_user_message: &str) -> bool {
        if !self.has_default_title() {
            return false;
        }

        let title = auto_title(first_user_message);
        if title.is_empty() {
            return false;
        }

        self.title = title;
        self.touch();
        true
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// First 50 characters of `content`, with an ellipsis when it was cut.
pub fn auto_title(content: &str) -> String {
    let mut title: String = content.chars().take(AUTO_TITLE_LENGTH).collect();
    if content.chars().count() > AUTO_TITLE_LENGTH {
        title.push_str("...");
    }
    title
}
