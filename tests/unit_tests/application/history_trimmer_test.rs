use akashchat::application::services::{
    DEFAULT_MESSAGE_LIMIT, DEFAULT_TOKEN_BUDGET, HistoryTrimmer, estimate_tokens,
};
use akashchat::domain::{ConversationId, Message, MessageId, MessageRole};

fn transcript(count: usize, content: &str) -> Vec<Message> {
    let conversation_id = ConversationId::new();
    let mut messages = Vec::with_capacity(count);
    let mut last_user = MessageId::new();

    for index in 0..count {
        let text = format!("{} {}", content, index);
        let message = if index % 2 == 0 {
            let message = Message::user(conversation_id, text);
            last_user = message.id;
            message
        } else {
            Message::assistant_reply(conversation_id, last_user, text)
        };
        messages.push(message);
    }

    messages
}

#[test]
fn given_text_when_estimating_tokens_then_counts_four_chars_per_token() {
    assert_eq!(estimate_tokens(""), 0);
    assert_eq!(estimate_tokens("abc"), 0);
    assert_eq!(estimate_tokens("abcdefgh"), 2);
}

#[test]
fn given_multibyte_text_when_estimating_tokens_then_counts_chars_not_bytes() {
    assert_eq!(estimate_tokens("日本語のテキスト"), 2);
}

#[test]
fn given_default_trimmer_then_uses_twelve_messages_and_three_thousand_tokens() {
    let trimmer = HistoryTrimmer::default();

    assert_eq!(trimmer.message_limit(), DEFAULT_MESSAGE_LIMIT);
    assert_eq!(trimmer.token_budget(), DEFAULT_TOKEN_BUDGET);
    assert_eq!(DEFAULT_MESSAGE_LIMIT, 12);
    assert_eq!(DEFAULT_TOKEN_BUDGET, 3000);
}

#[test]
fn given_empty_transcript_when_trimming_then_returns_empty() {
    let trimmer = HistoryTrimmer::default();

    assert!(trimmer.trim(&[]).is_empty());
}

#[test]
fn given_twenty_messages_when_trimming_with_limit_twelve_then_newest_twelve_in_order() {
    let messages = transcript(21, "short");
    let trimmer = HistoryTrimmer::default();

    let window = trimmer.trim(&messages);

    assert_eq!(window.len(), 12);
    assert_eq!(window, &messages[9..]);
    assert_eq!(window.last().map(|m| m.role), Some(MessageRole::User));
}

#[test]
fn given_short_transcript_when_trimming_then_everything_is_kept() {
    let messages = transcript(5, "hello");
    let trimmer = HistoryTrimmer::default();

    assert_eq!(trimmer.trim(&messages), &messages[..]);
}

#[test]
fn given_large_messages_when_trimming_then_token_budget_drops_oldest() {
    let messages = transcript(5, &"x".repeat(400));
    let trimmer = HistoryTrimmer::new(12, 250);

    let window = trimmer.trim(&messages);

    assert_eq!(window.len(), 2);
    assert_eq!(window, &messages[3..]);
}

#[test]
fn given_newest_user_message_over_budget_when_trimming_then_it_is_still_sent() {
    let conversation_id = ConversationId::new();
    let messages = vec![
        Message::user(conversation_id, "small".to_string()),
        Message::user(conversation_id, "y".repeat(2000)),
    ];
    let trimmer = HistoryTrimmer::new(12, 100);

    let window = trimmer.trim(&messages);

    assert_eq!(window.len(), 1);
    assert_eq!(window[0].id, messages[1].id);
}

#[test]
fn given_zero_message_limit_when_trimming_then_keeps_newest_user_message() {
    let messages = transcript(3, "hi");
    let trimmer = HistoryTrimmer::new(0, DEFAULT_TOKEN_BUDGET);

    let window = trimmer.trim(&messages);

    assert_eq!(window.len(), 1);
    assert_eq!(window[0].id, messages[2].id);
}
