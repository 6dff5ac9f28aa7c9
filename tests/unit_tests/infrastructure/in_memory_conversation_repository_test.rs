use akashchat::application::ports::{ConversationRepository, RepositoryError};
use akashchat::domain::{Conversation, ConversationId, Message, UserId};
use akashchat::infrastructure::persistence::InMemoryConversationRepository;

async fn repository_with_conversation() -> (InMemoryConversationRepository, Conversation) {
    let repository = InMemoryConversationRepository::new();
    let conversation = Conversation::new(UserId::new());
    repository.create_conversation(&conversation).await.unwrap();
    (repository, conversation)
}

#[tokio::test]
async fn given_created_conversation_when_retrieving_then_it_is_returned() {
    let (repository, conversation) = repository_with_conversation().await;

    let retrieved = repository
        .get_conversation(conversation.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(retrieved, conversation);
}

#[tokio::test]
async fn given_existing_conversation_when_creating_again_then_constraint_violation() {
    let (repository, conversation) = repository_with_conversation().await;

    let result = repository.create_conversation(&conversation).await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
}

#[tokio::test]
async fn given_unknown_conversation_when_saving_message_then_constraint_violation() {
    let repository = InMemoryConversationRepository::new();
    let message = Message::user(ConversationId::new(), "orphan".to_string());

    let result = repository.save_message(&message).await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
    assert!(repository.get_message(message.id).await.unwrap().is_none());
}

#[tokio::test]
async fn given_unknown_conversation_when_updating_then_not_found() {
    let repository = InMemoryConversationRepository::new();
    let conversation = Conversation::new(UserId::new());

    let result = repository.update_conversation(&conversation).await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
async fn given_saved_message_when_saving_again_then_it_is_updated_in_place() {
    let (repository, conversation) = repository_with_conversation().await;
    let mut message = Message::user(conversation.id, "draft".to_string());
    repository.save_message(&message).await.unwrap();

    message.edit_content("final".to_string()).unwrap();
    repository.save_message(&message).await.unwrap();

    let messages = repository
        .get_active_messages(conversation.id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "final");
    assert_eq!(messages[0].previous_content.as_deref(), Some("draft"));
}

#[tokio::test]
async fn given_saved_message_when_listing_then_conversation_updated_at_moves_forward() {
    let (repository, conversation) = repository_with_conversation().await;

    repository
        .save_message(&Message::user(conversation.id, "hi".to_string()))
        .await
        .unwrap();

    let stored = repository
        .get_conversation(conversation.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.updated_at >= conversation.updated_at);
}

#[tokio::test]
async fn given_replaced_reply_when_reading_then_only_replacement_is_active() {
    let (repository, conversation) = repository_with_conversation().await;
    let question = Message::user(conversation.id, "question".to_string());
    let mut first = Message::assistant_reply(conversation.id, question.id, "v1".to_string());
    repository.save_message(&question).await.unwrap();
    repository.save_message(&first).await.unwrap();

    let second = Message::assistant_reply(conversation.id, question.id, "v2".to_string());
    first.supersede_with(second.id).unwrap();
    repository.replace_reply(&first, &second).await.unwrap();

    let active = repository
        .get_active_messages(conversation.id)
        .await
        .unwrap();
    let active_ids: Vec<_> = active.iter().map(|m| m.id).collect();
    assert_eq!(active_ids, vec![question.id, second.id]);

    let found = repository.find_active_reply(question.id).await.unwrap();
    assert_eq!(found.map(|m| m.id), Some(second.id));

    let replies = repository.get_replies(question.id).await.unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].replaced_by, Some(second.id));
}

#[tokio::test]
async fn given_conversations_when_listing_then_most_recently_updated_first() {
    let repository = InMemoryConversationRepository::new();
    let owner = UserId::new();
    let mut older = Conversation::new(owner);
    let newer = Conversation::new(owner);
    repository.create_conversation(&older).await.unwrap();
    repository.create_conversation(&newer).await.unwrap();
    repository
        .create_conversation(&Conversation::new(UserId::new()))
        .await
        .unwrap();

    older.updated_at = newer.updated_at + chrono::Duration::seconds(5);
    repository.update_conversation(&older).await.unwrap();

    let listed = repository.list_conversations(owner).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![older.id, newer.id]);
}

#[tokio::test]
async fn given_conversation_with_messages_when_deleting_then_messages_are_removed() {
    let (repository, conversation) = repository_with_conversation().await;
    let message = Message::user(conversation.id, "bye".to_string());
    repository.save_message(&message).await.unwrap();

    let deleted = repository.delete_conversation(conversation.id).await.unwrap();
    let deleted_again = repository.delete_conversation(conversation.id).await.unwrap();

    assert!(deleted);
    assert!(!deleted_again);
    assert!(repository.get_message(message.id).await.unwrap().is_none());
}
