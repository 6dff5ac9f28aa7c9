use crate::presentation::config::{Environment, LoggingSettings};

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    pub default_filter: String,
}

impl TracingConfig {
    /// Builds the config from settings, switching to JSON when `LOG_FORMAT=json`.
    pub fn new(environment: Environment, logging: &LoggingSettings) -> Self {
        let log_format = std::env::var("LOG_FORMAT").ok();
        Self::with_log_format(environment, logging, log_format.as_deref())
    }

    pub fn with_log_format(
        environment: Environment,
        logging: &LoggingSettings,
        log_format: Option<&str>,
    ) -> Self {
        let json_requested = log_format.is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Self {
            environment: environment.to_string(),
            json_format: logging.json_format || json_requested,
            default_filter: logging.level.clone(),
        }
    }
}
