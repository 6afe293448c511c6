use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{auth::services::AuthUser, state::AppState};

use super::{
    dto::{is_valid_level, EnergyLogRequest},
    repo::{self, EnergyLog},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/energy/logs", get(list_logs).post(create_log))
        .route(
            "/energy/logs/:id",
            get(get_log).put(update_log).delete(delete_log),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<EnergyLogRequest>,
) -> Result<(StatusCode, Json<EnergyLog>), (StatusCode, String)> {
    if !is_valid_level(payload.energy_level) {
        warn!(level = payload.energy_level, "rejected energy level");
        return Err((
            StatusCode::BAD_REQUEST,
            "energy_level must be between 1 and 5".into(),
        ));
    }

    let log = repo::create(&state.db, user_id, payload.energy_level)
        .await
        .map_err(internal)?;
    info!(user_id = %user_id, log_id = %log.id, level = log.energy_level, "energy log created");
    Ok((StatusCode::CREATED, Json(log)))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<EnergyLog>>, (StatusCode, String)> {
    let logs = repo::list_by_user(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(logs))
}

#[instrument(skip(state))]
pub async fn get_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EnergyLog>, (StatusCode, String)> {
    match repo::get_by_id(&state.db, user_id, id).await.map_err(internal)? {
        Some(log) => Ok(Json(log)),
        None => Err((StatusCode::NOT_FOUND, "Energy log not found".into())),
    }
}

#[instrument(skip(state, payload))]
pub async fn update_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EnergyLogRequest>,
) -> Result<Json<EnergyLog>, (StatusCode, String)> {
    if !is_valid_level(payload.energy_level) {
        warn!(level = payload.energy_level, "rejected energy level");
        return Err((
            StatusCode::BAD_REQUEST,
            "energy_level must be between 1 and 5".into(),
        ));
    }

    match repo::update_level(&state.db, user_id, id, payload.energy_level)
        .await
        .map_err(internal)?
    {
        Some(log) => Ok(Json(log)),
        None => Err((StatusCode::NOT_FOUND, "Energy log not found".into())),
    }
}

#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if repo::delete(&state.db, user_id, id).await.map_err(internal)? {
        info!(user_id = %user_id, log_id = %id, "energy log deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Energy log not found".into()))
    }
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
