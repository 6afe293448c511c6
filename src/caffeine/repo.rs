use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::CreateCaffeineLogRequest;

/// One consumption event. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CaffeineLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caffeine_mg: f64,
    pub beverage_name: Option<String>,
    pub serving_size: Option<String>,
    pub total_fat_g: Option<f64>,
    pub sodium_mg: Option<f64>,
    pub total_carbohydrates_g: Option<f64>,
    pub sugars_g: Option<f64>,
    pub added_sugars_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub taurine_mg: Option<f64>,
    pub calories_kcal: Option<f64>,
    pub b_vitamins: Option<serde_json::Value>,
    pub other_ingredients: Option<serde_json::Value>,
    pub image_url: Option<String>,
    pub additional_notes: Option<String>,
    pub confirmed: bool,
    pub created_at: OffsetDateTime,
}

const LOG_COLUMNS: &str = r#"
    id, user_id, caffeine_mg, beverage_name, serving_size, total_fat_g,
    sodium_mg, total_carbohydrates_g, sugars_g, added_sugars_g, protein_g,
    taurine_mg, calories_kcal, b_vitamins, other_ingredients, image_url,
    additional_notes, confirmed, created_at
"#;

/// A persisted log is by definition one the user accepted; whatever the
/// client sent for `confirmed` cannot unset that.
pub fn confirmed_at_creation(_client_supplied: Option<bool>) -> bool {
    true
}

/// Insert a new log. `confirmed` is forced true server-side.
pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    caffeine_mg: f64,
    req: &CreateCaffeineLogRequest,
) -> anyhow::Result<CaffeineLog> {
    let sql = format!(
        r#"
        INSERT INTO caffeine_logs (
            user_id, caffeine_mg, beverage_name, serving_size, total_fat_g,
            sodium_mg, total_carbohydrates_g, sugars_g, added_sugars_g,
            protein_g, taurine_mg, calories_kcal, b_vitamins,
            other_ingredients, image_url, additional_notes, confirmed
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING {LOG_COLUMNS}
        "#
    );
    let log = sqlx::query_as::<_, CaffeineLog>(&sql)
        .bind(user_id)
        .bind(caffeine_mg)
        .bind(&req.beverage_name)
        .bind(&req.serving_size)
        .bind(req.total_fat_g)
        .bind(req.sodium_mg)
        .bind(req.total_carbohydrates_g)
        .bind(req.sugars_g)
        .bind(req.added_sugars_g)
        .bind(req.protein_g)
        .bind(req.taurine_mg)
        .bind(req.calories_kcal)
        .bind(&req.b_vitamins)
        .bind(&req.other_ingredients)
        .bind(&req.image_url)
        .bind(&req.additional_notes)
        .bind(confirmed_at_creation(req.confirmed))
        .fetch_one(db)
        .await?;
    Ok(log)
}

#[cfg(test)]
mod confirmed_tests {
    use super::*;

    #[test]
    fn creation_confirms_regardless_of_client_value() {
        assert!(confirmed_at_creation(None));
        assert!(confirmed_at_creation(Some(true)));
        assert!(confirmed_at_creation(Some(false)));
    }
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<CaffeineLog>> {
    let sql = format!(
        r#"
        SELECT {LOG_COLUMNS}
        FROM caffeine_logs
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, CaffeineLog>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn get_by_id(
    db: &PgPool,
    user_id: Uuid,
    log_id: Uuid,
) -> anyhow::Result<Option<CaffeineLog>> {
    let sql = format!(
        r#"
        SELECT {LOG_COLUMNS}
        FROM caffeine_logs
        WHERE id = $1 AND user_id = $2
        "#
    );
    let row = sqlx::query_as::<_, CaffeineLog>(&sql)
        .bind(log_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// All of a user's events ordered oldest first, for the over-time projection.
pub async fn list_by_user_ascending(
    db: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Vec<CaffeineLog>> {
    let sql = format!(
        r#"
        SELECT {LOG_COLUMNS}
        FROM caffeine_logs
        WHERE user_id = $1
        ORDER BY created_at ASC
        "#
    );
    let rows = sqlx::query_as::<_, CaffeineLog>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Most recent events, newest first, for chat personalization.
pub async fn recent_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> anyhow::Result<Vec<CaffeineLog>> {
    list_by_user(db, user_id, limit, 0).await
}
