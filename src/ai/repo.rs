use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One chat exchange: the user's message and the model's reply. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub response: Option<String>,
    pub created_at: OffsetDateTime,
}

pub async fn insert_chat_message(
    db: &PgPool,
    user_id: Uuid,
    message: &str,
    response: &str,
) -> anyhow::Result<ChatMessage> {
    let row = sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO chat_messages (user_id, message, response)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, message, response, created_at
        "#,
    )
    .bind(user_id)
    .bind(message)
    .bind(response)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_chat_messages(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ChatMessage>> {
    let rows = sqlx::query_as::<_, ChatMessage>(
        r#"
        SELECT id, user_id, message, response, created_at
        FROM chat_messages
        WHERE user_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
