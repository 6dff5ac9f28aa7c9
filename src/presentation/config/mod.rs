mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ChatSettings, DatabaseSettings, LlmProvider, LlmSettings, LoggingSettings, ServerSettings,
    Settings,
};
