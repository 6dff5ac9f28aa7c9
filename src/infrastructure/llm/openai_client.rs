use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::application::ports::{ChatTurn, LlmClient, LlmClientError, ModerationVerdict};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for OpenAI-compatible `chat/completions` and `moderations` endpoints.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_tokens: usize,
    temperature: f32,
    system_prompt: Option<String>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Deserialize)]
struct ModerationResult {
    flagged: bool,
    #[serde(default)]
    categories: BTreeMap<String, bool>,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        max_tokens: usize,
        temperature: f32,
        system_prompt: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_tokens,
            temperature,
            system_prompt,
        }
    }

    fn build_messages<'a>(&'a self, turns: &'a [ChatTurn]) -> Vec<ChatMessage<'a>> {
        let system = self.system_prompt.as_deref().map(|content| ChatMessage {
            role: "system",
            content,
        });

        system
            .into_iter()
            .chain(turns.iter().map(|turn| ChatMessage {
                role: turn.role.as_str(),
                content: &turn.content,
            }))
            .collect()
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/{}", self.base_url, endpoint))
            .bearer_auth(&self.api_key)
    }
}

async fn check_status(response: Response) -> Result<Response, LlmClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(LlmClientError::RateLimited),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(LlmClientError::AuthenticationFailed)
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    #[instrument(skip(self, turns), fields(turns = turns.len()))]
    async fn complete(&self, model: &str, turns: &[ChatTurn]) -> Result<String, LlmClientError> {
        let request_body = ChatCompletionRequest {
            model,
            messages: self.build_messages(turns),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .post("chat/completions")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        let completion: ChatCompletionResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmClientError::InvalidResponse("empty choices".to_string()))
    }

    #[instrument(skip(self, text))]
    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, LlmClientError> {
        let response = self
            .post("moderations")
            .json(&ModerationRequest { input: text })
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        let moderation: ModerationResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        let result = moderation
            .results
            .into_iter()
            .next()
            .ok_or_else(|| LlmClientError::InvalidResponse("empty results".to_string()))?;

        Ok(ModerationVerdict {
            flagged: result.flagged,
            categories: if result.flagged {
                result.categories
            } else {
                BTreeMap::new()
            },
        })
    }
}
