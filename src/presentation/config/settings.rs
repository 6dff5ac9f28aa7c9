use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::services::{DEFAULT_MESSAGE_LIMIT, DEFAULT_TOKEN_BUDGET};

use super::Environment;

const ENV_PREFIX: &str = "APP";
const OPENAI_API_KEY_VARIABLE: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    /// Without a database the service keeps conversations in memory.
    pub database: Option<DatabaseSettings>,
    pub llm: LlmSettings,
    pub chat: ChatSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layers `appsettings.{environment}.toml` (optional) under `APP_*`
    /// environment variables, e.g. `APP_LLM__CHAT_MODEL`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let configuration = Config::builder()
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut settings: Settings = configuration.try_deserialize()?;

        if settings.llm.api_key.is_empty() {
            if let Ok(api_key) = std::env::var(OPENAI_API_KEY_VARIABLE) {
                settings.llm.api_key = api_key;
            }
        }

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Any server speaking the OpenAI wire format at `base_url`.
    Compatible,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub base_url: Option<String>,
    pub api_key: String,
    pub chat_model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub system_prompt: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: None,
            api_key: String::new(),
            chat_model: "gpt-4o-mini".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub history_message_limit: usize,
    pub history_token_budget: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            history_message_limit: DEFAULT_MESSAGE_LIMIT,
            history_token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,akashchat=debug,tower_http=debug".to_string(),
            json_format: false,
        }
    }
}
