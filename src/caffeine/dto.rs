use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::decay::DecayPoint;

/// Create body. `caffeine_mg` is the only mandatory nutritional field.
/// A client-supplied `confirmed` value is accepted but ignored; persisted
/// logs are always confirmed.
#[derive(Debug, Deserialize)]
pub struct CreateCaffeineLogRequest {
    /// Optional at the serde level so its absence maps to a 400 with a
    /// descriptive body instead of a deserialization rejection.
    pub caffeine_mg: Option<f64>,
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
    #[serde(default)]
    pub confirmed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

const MAX_LIMIT: i64 = 100;

impl Pagination {
    /// Client input sanitized for the SQL LIMIT/OFFSET slots: negative values
    /// would otherwise surface as a Postgres error.
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(0, MAX_LIMIT), self.offset.max(0))
    }
}

/// One event's projection in the over-time response.
#[derive(Debug, Serialize)]
pub struct CaffeineOverTimeEntry {
    pub log_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    pub caffeine_mg: f64,
    pub curve: Vec<DecayPoint>,
}
