use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One self-reported energy level on the 1..=5 ordinal scale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnergyLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub energy_level: i16,
    pub created_at: OffsetDateTime,
}

pub async fn create(db: &PgPool, user_id: Uuid, energy_level: i16) -> anyhow::Result<EnergyLog> {
    let log = sqlx::query_as::<_, EnergyLog>(
        r#"
        INSERT INTO energy_logs (user_id, energy_level)
        VALUES ($1, $2)
        RETURNING id, user_id, energy_level, created_at
        "#,
    )
    .bind(user_id)
    .bind(energy_level)
    .fetch_one(db)
    .await?;
    Ok(log)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<EnergyLog>> {
    let rows = sqlx::query_as::<_, EnergyLog>(
        r#"
        SELECT id, user_id, energy_level, created_at
        FROM energy_logs
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get_by_id(
    db: &PgPool,
    user_id: Uuid,
    log_id: Uuid,
) -> anyhow::Result<Option<EnergyLog>> {
    let row = sqlx::query_as::<_, EnergyLog>(
        r#"
        SELECT id, user_id, energy_level, created_at
        FROM energy_logs
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(log_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn update_level(
    db: &PgPool,
    user_id: Uuid,
    log_id: Uuid,
    energy_level: i16,
) -> anyhow::Result<Option<EnergyLog>> {
    let row = sqlx::query_as::<_, EnergyLog>(
        r#"
        UPDATE energy_logs
        SET energy_level = $3
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, energy_level, created_at
        "#,
    )
    .bind(log_id)
    .bind(user_id)
    .bind(energy_level)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Returns true when a row was deleted.
pub async fn delete(db: &PgPool, user_id: Uuid, log_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM energy_logs
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(log_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
