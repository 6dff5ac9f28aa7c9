use akashchat::domain::{Conversation, DEFAULT_TITLE, UserId, auto_title};

#[test]
fn given_new_conversation_when_created_then_has_default_title_and_owner() {
    let owner = UserId::new();

    let conversation = Conversation::new(owner);

    assert_eq!(conversation.title, DEFAULT_TITLE);
    assert!(conversation.has_default_title());
    assert!(conversation.is_owned_by(owner));
    assert!(!conversation.is_owned_by(UserId::new()));
    assert_eq!(conversation.created_at, conversation.updated_at);
}

#[test]
fn given_short_message_when_auto_titling_then_title_is_message() {
    assert_eq!(auto_title("Hello"), "Hello");
}

#[test]
fn given_message_of_exactly_fifty_chars_when_auto_titling_then_no_ellipsis() {
    let content = "a".repeat(50);

    assert_eq!(auto_title(&content), content);
}

#[test]
fn given_long_message_when_auto_titling_then_truncated_to_fifty_chars_with_ellipsis() {
    let content = "b".repeat(80);

    let title = auto_title(&content);

    assert_eq!(title, format!("{}...", "b".repeat(50)));
}

#[test]
fn given_multibyte_message_when_auto_titling_then_cuts_on_char_boundary() {
    let content = "ü".repeat(60);

    let title = auto_title(&content);

    assert_eq!(title.chars().count(), 53);
    assert!(title.ends_with("..."));
}

#[test]
fn given_default_title_when_applying_auto_title_then_title_changes() {
    let mut conversation = Conversation::new(UserId::new());

    let changed = conversation.apply_auto_title("What is borrow checking?");

    assert!(changed);
    assert_eq!(conversation.title, "What is borrow checking?");
    assert!(conversation.updated_at >= conversation.created_at);
}

#[test]
fn given_renamed_conversation_when_applying_auto_title_then_title_is_kept() {
    let mut conversation = Conversation::new(UserId::new());
    conversation.rename("Rust questions".to_string());

    let changed = conversation.apply_auto_title("Hello");

    assert!(!changed);
    assert_eq!(conversation.title, "Rust questions");
}

#[test]
fn given_empty_first_message_when_applying_auto_title_then_default_title_is_kept() {
    let mut conversation = Conversation::new(UserId::new());

    assert!(!conversation.apply_auto_title(""));
    assert_eq!(conversation.title, DEFAULT_TITLE);
}

#[test]
fn given_conversation_renamed_to_default_title_when_applying_auto_title_then_title_is_kept() {
    let mut conversation = Conversation::new(UserId::new());
    conversation.rename(DEFAULT_TITLE.to_string());

    let changed = conversation.apply_auto_title("Hello");

    assert!(!changed);
    assert!(conversation.title_is_custom);
    assert_eq!(conversation.title, DEFAULT_TITLE);
}
