use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use akashchat::application::ports::ConversationRepository;
use akashchat::application::services::{ChatService, HistoryTrimmer};
use akashchat::infrastructure::llm::create_llm_client;
use akashchat::infrastructure::observability::{TracingConfig, init_tracing};
use akashchat::infrastructure::persistence::{
    InMemoryConversationRepository, PgConversationRepository, create_pool, run_migrations,
};
use akashchat::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        &TracingConfig::new(environment, &settings.logging),
        settings.server.port,
    );

    let repository: Arc<dyn ConversationRepository> = match &settings.database {
        Some(database) => {
            let pool = create_pool(&database.url, database.max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            Arc::new(PgConversationRepository::new(pool))
        }
        None => {
            tracing::warn!("No database configured, conversations are kept in memory");
            Arc::new(InMemoryConversationRepository::new())
        }
    };

    let llm_client = create_llm_client(&settings.llm).context("Failed to create LLM client")?;

    let trimmer = HistoryTrimmer::new(
        settings.chat.history_message_limit,
        settings.chat.history_token_budget,
    );

    let chat_service = Arc::new(ChatService::new(
        repository,
        llm_client,
        trimmer,
        settings.llm.chat_model.clone(),
    ));

    let router = create_router(AppState { chat_service });

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!(%addr, model = %settings.llm.chat_model, "Listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
