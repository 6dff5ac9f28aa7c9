use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{Conversation, ConversationId, Message, MessageId, MessageRole, UserId};

pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    title_is_custom: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Conversation {
            id: ConversationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            title: row.title,
            title_is_custom: row.title_is_custom,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
    edited: bool,
    edited_at: Option<DateTime<Utc>>,
    previous_content: Option<String>,
    superseded: bool,
    replaced_by: Option<Uuid>,
    parent_user_message: Option<Uuid>,
}

impl TryFrom<MessageRow> for Message {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<MessageRole>()
            .map_err(RepositoryError::InvalidRow)?;

        Ok(Message {
            id: MessageId::from_uuid(row.id),
            conversation_id: ConversationId::from_uuid(row.conversation_id),
            role,
            content: row.content,
            created_at: row.created_at,
            edited: row.edited,
            edited_at: row.edited_at,
            previous_content: row.previous_content,
            superseded: row.superseded,
            replaced_by: row.replaced_by.map(MessageId::from_uuid),
            parent_user_message: row.parent_user_message.map(MessageId::from_uuid),
        })
    }
}

fn into_messages(rows: Vec<MessageRow>) -> Result<Vec<Message>, RepositoryError> {
    rows.into_iter().map(Message::try_from).collect()
}

fn map_sqlx_error(error: sqlx::Error) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db)
            if db.is_foreign_key_violation()
                || db.is_unique_violation()
                || db.is_check_violation() =>
        {
            RepositoryError::ConstraintViolation(db.message().to_string())
        }
        _ => RepositoryError::QueryFailed(error.to_string()),
    }
}

async fn upsert_message(conn: &mut PgConnection, message: &Message) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO messages (
            id, conversation_id, role, content, created_at, edited, edited_at,
            previous_content, superseded, replaced_by, parent_user_message
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE
        SET content = EXCLUDED.content,
            edited = EXCLUDED.edited,
            edited_at = EXCLUDED.edited_at,
            previous_content = EXCLUDED.previous_content,
            superseded = EXCLUDED.superseded,
            replaced_by = EXCLUDED.replaced_by
        "#,
    )
    .bind(message.id.as_uuid())
    .bind(message.conversation_id.as_uuid())
    .bind(message.role.as_str())
    .bind(&message.content)
    .bind(message.created_at)
    .bind(message.edited)
    .bind(message.edited_at)
    .bind(message.previous_content.as_deref())
    .bind(message.superseded)
    .bind(message.replaced_by.map(|id| id.as_uuid()))
    .bind(message.parent_user_message.map(|id| id.as_uuid()))
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(())
}

async fn touch_conversation(
    conn: &mut PgConnection,
    conversation_id: ConversationId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        UPDATE conversations
        SET updated_at = $1
        WHERE id = $2
        "#,
    )
    .bind(Utc::now())
    .bind(conversation_id.as_uuid())
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(())
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id))]
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO conversations (id, user_id, title, title_is_custom, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(conversation.id.as_uuid())
        .bind(conversation.user_id.as_uuid())
        .bind(&conversation.title)
        .bind(conversation.title_is_custom)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, user_id, title, title_is_custom, created_at, updated_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Conversation::from))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, user_id, title, title_is_custom, created_at, updated_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Conversation::from).collect())
    }

    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id))]
    async fn update_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET title = $1, title_is_custom = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(&conversation.title)
        .bind(conversation.title_is_custom)
        .bind(conversation.updated_at)
        .bind(conversation.id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "conversation {}",
                conversation.id
            )));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn delete_conversation(&self, id: ConversationId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, conversation_id = %message.conversation_id))]
    async fn save_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        upsert_message(&mut tx, message).await?;
        touch_conversation(&mut tx, message.conversation_id).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    #[instrument(skip(self), fields(message_id = %id))]
    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, conversation_id, role, content, created_at, edited, edited_at,
                   previous_content, superseded, replaced_by, parent_user_message
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Message::try_from).transpose()
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id))]
    async fn get_active_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, conversation_id, role, content, created_at, edited, edited_at,
                   previous_content, superseded, replaced_by, parent_user_message
            FROM messages
            WHERE conversation_id = $1 AND superseded = FALSE
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(conversation_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        into_messages(rows)
    }

    #[instrument(skip(self), fields(message_id = %user_message_id))]
    async fn get_replies(
        &self,
        user_message_id: MessageId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, conversation_id, role, content, created_at, edited, edited_at,
                   previous_content, superseded, replaced_by, parent_user_message
            FROM messages
            WHERE parent_user_message = $1 AND role = 'assistant'
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(user_message_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        into_messages(rows)
    }

    #[instrument(skip(self), fields(message_id = %user_message_id))]
    async fn find_active_reply(
        &self,
        user_message_id: MessageId,
    ) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, conversation_id, role, content, created_at, edited, edited_at,
                   previous_content, superseded, replaced_by, parent_user_message
            FROM messages
            WHERE parent_user_message = $1 AND role = 'assistant' AND superseded = FALSE
            ORDER BY created_at DESC, seq DESC
            LIMIT 1
            "#,
        )
        .bind(user_message_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Message::try_from).transpose()
    }

    #[instrument(skip(self, previous, replacement), fields(previous_id = %previous.id, replacement_id = %replacement.id))]
    async fn replace_reply(
        &self,
        previous: &Message,
        replacement: &Message,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // The replacement row must exist before `replaced_by` can reference it.
        upsert_message(&mut tx, replacement).await?;
        upsert_message(&mut tx, previous).await?;
        touch_conversation(&mut tx, replacement.conversation_id).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}
