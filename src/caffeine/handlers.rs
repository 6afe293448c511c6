use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{auth::services::AuthUser, state::AppState};

use super::{
    decay,
    dto::{CaffeineOverTimeEntry, CreateCaffeineLogRequest, Pagination},
    repo::{self, CaffeineLog},
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/caffeine/logs", get(list_logs))
        .route("/caffeine/logs/:id", get(get_log))
        .route("/caffeine/over-time", get(over_time))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/caffeine/logs", post(create_log))
}

#[instrument(skip(state, payload))]
pub async fn create_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateCaffeineLogRequest>,
) -> Result<(StatusCode, Json<CaffeineLog>), (StatusCode, String)> {
    let Some(caffeine_mg) = payload.caffeine_mg else {
        warn!("missing caffeine_mg");
        return Err((StatusCode::BAD_REQUEST, "caffeine_mg is required".into()));
    };
    if !caffeine_mg.is_finite() || caffeine_mg < 0.0 {
        warn!(caffeine_mg, "rejected caffeine amount");
        return Err((
            StatusCode::BAD_REQUEST,
            "caffeine_mg must be a non-negative number".into(),
        ));
    }

    let log = repo::create(&state.db, user_id, caffeine_mg, &payload)
        .await
        .map_err(internal)?;
    info!(user_id = %user_id, log_id = %log.id, caffeine_mg = log.caffeine_mg, "caffeine log created");
    Ok((StatusCode::CREATED, Json(log)))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<CaffeineLog>>, (StatusCode, String)> {
    let (limit, offset) = p.clamped();
    let logs = repo::list_by_user(&state.db, user_id, limit, offset)
        .await
        .map_err(internal)?;
    Ok(Json(logs))
}

#[instrument(skip(state))]
pub async fn get_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CaffeineLog>, (StatusCode, String)> {
    match repo::get_by_id(&state.db, user_id, id).await {
        Ok(Some(log)) => Ok(Json(log)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Caffeine log not found".into())),
        Err(e) => {
            error!(error = %e, %user_id, %id, "get_log failed");
            Err(internal(e))
        }
    }
}

/// Per-event decay projection. No logs means an empty list, not an error.
#[instrument(skip(state))]
pub async fn over_time(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<CaffeineOverTimeEntry>>, (StatusCode, String)> {
    let logs = repo::list_by_user_ascending(&state.db, user_id)
        .await
        .map_err(internal)?;
    let entries = project_over_time(logs);
    Ok(Json(entries))
}

fn project_over_time(logs: Vec<CaffeineLog>) -> Vec<CaffeineOverTimeEntry> {
    logs.into_iter()
        .map(|log| CaffeineOverTimeEntry {
            log_id: log.id,
            logged_at: log.created_at,
            caffeine_mg: log.caffeine_mg,
            curve: decay::decay_curve(log.caffeine_mg),
        })
        .collect()
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod projection_tests {
    use super::*;
    use time::OffsetDateTime;

    fn log(mg: f64) -> CaffeineLog {
        CaffeineLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            caffeine_mg: mg,
            beverage_name: None,
            serving_size: None,
            total_fat_g: None,
            sodium_mg: None,
            total_carbohydrates_g: None,
            sugars_g: None,
            added_sugars_g: None,
            protein_g: None,
            taurine_mg: None,
            calories_kcal: None,
            b_vitamins: None,
            other_ingredients: None,
            image_url: None,
            additional_notes: None,
            confirmed: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn empty_logs_project_to_empty_list() {
        assert!(project_over_time(vec![]).is_empty());
    }

    #[test]
    fn each_event_gets_its_own_curve() {
        let entries = project_over_time(vec![log(100.0), log(50.0)]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].curve.len(), 25);
        assert_eq!(entries[1].curve.len(), 25);
        // Curves are independent, not merged
        assert_eq!(entries[0].curve[0].remaining_mg, 100.0);
        assert_eq!(entries[1].curve[0].remaining_mg, 50.0);
    }

    #[tokio::test]
    async fn create_rejects_missing_caffeine_mg() {
        let state = crate::state::AppState::fake();
        let payload: CreateCaffeineLogRequest = serde_json::from_str("{}").unwrap();
        let (status, body) = create_log(State(state), AuthUser(Uuid::new_v4()), Json(payload))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("caffeine_mg"));
    }

    #[tokio::test]
    async fn create_rejects_negative_caffeine_mg() {
        let state = crate::state::AppState::fake();
        let payload: CreateCaffeineLogRequest =
            serde_json::from_str(r#"{"caffeine_mg": -10.0}"#).unwrap();
        let (status, body) = create_log(State(state), AuthUser(Uuid::new_v4()), Json(payload))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("caffeine_mg"));
    }

    #[test]
    fn curve_values_follow_half_life() {
        let entries = project_over_time(vec![log(100.0)]);
        let curve = &entries[0].curve;
        assert!((curve[5].remaining_mg - 50.0).abs() < 1e-9);
        assert!((curve[10].remaining_mg - 25.0).abs() < 1e-9);
        assert!((curve[24].remaining_mg - 4.3).abs() < 0.1);
    }
}
