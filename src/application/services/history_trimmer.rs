use crate::domain::{Message, MessageRole};

pub const DEFAULT_MESSAGE_LIMIT: usize = 12;
pub const DEFAULT_TOKEN_BUDGET: usize = 3000;

const CHARS_PER_TOKEN: usize = 4;

/// Rough token estimate: four characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}

/// Selects the slice of a transcript that is forwarded to the completion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryTrimmer {
    message_limit: usize,
    token_budget: usize,
}

impl Default for HistoryTrimmer {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_LIMIT, DEFAULT_TOKEN_BUDGET)
    }
}

impl HistoryTrimmer {
    pub fn new(message_limit: usize, token_budget: usize) -> Self {
        Self {
            message_limit,
            token_budget,
        }
    }

    pub fn message_limit(&self) -> usize {
        self.message_limit
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// Keeps the newest messages that fit both the message limit and the token
    /// budget, dropping the oldest first.
    ///
    /// The result is always a contiguous suffix of `transcript`. It reaches back
    /// at least to the newest user message, even when that message alone is over
    /// budget.
    pub fn trim<'a>(&self, transcript: &'a [Message]) -> &'a [Message] {
        let mut start = transcript.len();
        let mut tokens = 0;

        for (index, message) in transcript.iter().enumerate().rev() {
            if transcript.len() - index > self.message_limit {
                break;
            }

            let cost = estimate_tokens(&message.content);
            if tokens + cost > self.token_budget {
                break;
            }

            tokens += cost;
            start = index;
        }

        if let Some(newest_user) = transcript
            .iter()
            .rposition(|m| m.role == MessageRole::User)
        {
            start = start.min(newest_user);
        }

        &transcript[start..]
    }
}
