mod in_memory_conversation_repository_test;
mod llm_client_factory_test;
