mod conversation_test;
mod message_role_test;
