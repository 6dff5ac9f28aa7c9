use std::sync::Arc;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::presentation::config::{LlmProvider, LlmSettings};

use super::{MockLlmClient, OPENAI_BASE_URL, OpenAiClient};

pub fn create_llm_client(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, LlmClientError> {
    match settings.provider {
        LlmProvider::OpenAi => {
            if settings.api_key.trim().is_empty() {
                return Err(LlmClientError::AuthenticationFailed);
            }
            Ok(Arc::new(openai_client(settings, OPENAI_BASE_URL)))
        }
        LlmProvider::Compatible => {
            let base_url = settings.base_url.as_deref().ok_or_else(|| {
                LlmClientError::InvalidResponse(
                    "base_url required for compatible provider".to_string(),
                )
            })?;
            Ok(Arc::new(openai_client(settings, base_url)))
        }
        LlmProvider::Mock => {
            tracing::warn!("Using mock LLM client, replies are canned");
            Ok(Arc::new(MockLlmClient))
        }
    }
}

fn openai_client(settings: &LlmSettings, base_url: &str) -> OpenAiClient {
    OpenAiClient::new(
        base_url,
        settings.api_key.clone(),
        settings.max_tokens,
        settings.temperature,
        settings.system_prompt.clone(),
    )
}
