use akashchat::application::ports::{ChatTurn, LlmClientError};
use akashchat::domain::MessageRole;
use akashchat::infrastructure::llm::create_llm_client;
use akashchat::presentation::config::{LlmProvider, LlmSettings};

#[test]
fn given_openai_provider_without_api_key_when_creating_client_then_authentication_fails() {
    let settings = LlmSettings {
        provider: LlmProvider::OpenAi,
        api_key: "  ".to_string(),
        ..LlmSettings::default()
    };

    let result = create_llm_client(&settings);

    assert!(matches!(result, Err(LlmClientError::AuthenticationFailed)));
}

#[test]
fn given_openai_provider_with_api_key_when_creating_client_then_succeeds() {
    let settings = LlmSettings {
        api_key: "sk-test".to_string(),
        ..LlmSettings::default()
    };

    assert!(create_llm_client(&settings).is_ok());
}

#[test]
fn given_compatible_provider_without_base_url_when_creating_client_then_fails() {
    let settings = LlmSettings {
        provider: LlmProvider::Compatible,
        ..LlmSettings::default()
    };

    let result = create_llm_client(&settings);

    assert!(matches!(result, Err(LlmClientError::InvalidResponse(_))));
}

#[test]
fn given_compatible_provider_with_base_url_when_creating_client_then_api_key_is_optional() {
    let settings = LlmSettings {
        provider: LlmProvider::Compatible,
        base_url: Some("http://localhost:1234/v1".to_string()),
        ..LlmSettings::default()
    };

    assert!(create_llm_client(&settings).is_ok());
}

#[tokio::test]
async fn given_mock_provider_when_completing_then_echoes_last_user_turn() {
    let settings = LlmSettings {
        provider: LlmProvider::Mock,
        ..LlmSettings::default()
    };
    let client = create_llm_client(&settings).unwrap();
    let turns = vec![
        ChatTurn {
            role: MessageRole::User,
            content: "first".to_string(),
        },
        ChatTurn {
            role: MessageRole::Assistant,
            content: "answer".to_string(),
        },
        ChatTurn {
            role: MessageRole::User,
            content: "second".to_string(),
        },
    ];

    let reply = client.complete("gpt-4o-mini", &turns).await.unwrap();
    let verdict = client.moderate("anything").await.unwrap();

    assert_eq!(reply, "[gpt-4o-mini] Echo: second");
    assert!(!verdict.flagged);
}
