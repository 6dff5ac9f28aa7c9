use std::str::FromStr;

use akashchat::domain::MessageRole;

#[test]
fn given_role_when_rendered_then_uses_wire_name() {
    assert_eq!(MessageRole::User.as_str(), "user");
    assert_eq!(MessageRole::Assistant.to_string(), "assistant");
}

#[test]
fn given_wire_name_when_parsing_then_returns_role() {
    assert_eq!(MessageRole::from_str("user"), Ok(MessageRole::User));
    assert_eq!(MessageRole::from_str("assistant"), Ok(MessageRole::Assistant));
}

#[test]
fn given_unknown_role_when_parsing_then_returns_error() {
    let result = MessageRole::from_str("system");

    assert_eq!(result, Err("Invalid message role: system".to_string()));
}
