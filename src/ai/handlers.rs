use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::json;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    caffeine,
    state::AppState,
    storage::drink_image_key,
};

use super::{
    client::{parse_analysis, AiImage},
    dto::{AnalyzeDrinkRequest, ChatRequest, ChatResponse, SubmitDrinkResponse},
    prompt::{chat_prompt, drink_analysis_prompt},
    repo::{self, ChatMessage},
};

/// Recent intake events embedded into the chat prompt.
const CHAT_HISTORY_LIMIT: i64 = 10;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ai/analyze-drink", post(analyze_drink))
        .route(
            "/ai/submit-drink",
            post(submit_drink).layer(DefaultBodyLimit::max(20 * 1024 * 1024)),
        )
        .route("/ai/chat", post(chat))
        .route("/ai/chat/history", get(chat_history))
}

/// Analyze a drink image that is already hosted somewhere reachable.
#[instrument(skip(state, payload))]
pub async fn analyze_drink(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AnalyzeDrinkRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let Some(image_url) = payload.image_url.as_deref().filter(|u| !u.is_empty()) else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Image URL is required for analysis".into(),
        ));
    };

    let image = fetch_image(&state, image_url).await.map_err(|e| {
        warn!(error = %e, image_url, "image fetch failed");
        (
            StatusCode::BAD_REQUEST,
            format!("Error processing image: {e}"),
        )
    })?;

    let hints = if payload.additional_inputs.is_null() {
        json!({})
    } else {
        payload.additional_inputs.clone()
    };
    let prompt = drink_analysis_prompt(&hints, &payload.additional_notes);

    let reply = state
        .ai
        .generate(&prompt, Some(image))
        .await
        .map_err(ai_error)?;
    info!(user_id = %user_id, "drink analyzed");
    Ok(Json(parse_analysis(&reply)))
}

/// Upload a drink photo, publish it, and analyze it in one request.
#[instrument(skip(state, mp))]
pub async fn submit_drink(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<SubmitDrinkResponse>, (StatusCode, String)> {
    let mut image: Option<(Bytes, String)> = None;
    let mut hints = serde_json::Map::new();
    let mut notes = String::new();

    loop {
        let field = match mp.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "multipart read failed");
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("invalid multipart body: {e}"),
                ));
            }
        };
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("image") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field.bytes().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("invalid image field: {e}"))
                })?;
                image = Some((data, content_type));
            }
            Some("additional_notes") => {
                notes = field.text().await.unwrap_or_default();
            }
            Some(key @ ("beverage_size_ml" | "sugar_content_g" | "calories_kcal")) => {
                let key = key.to_string();
                if let Ok(text) = field.text().await {
                    if let Ok(num) = text.parse::<f64>() {
                        hints.insert(key, json!(num));
                    }
                }
            }
            _ => {}
        }
    }

    let Some((bytes, content_type)) = image else {
        return Err((StatusCode::BAD_REQUEST, "image is required".into()));
    };

    let key = drink_image_key(user_id, &content_type);
    state
        .storage
        .put_object(&key, bytes.clone(), &content_type)
        .await
        .map_err(|e| {
            error!(error = %e, key, "image upload failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    // Best-effort checks; the upload already succeeded.
    match state.storage.object_exists(&key).await {
        Ok(true) => {}
        Ok(false) => warn!(key, "uploaded object not visible yet"),
        Err(e) => warn!(error = %e, key, "object existence check failed"),
    }

    let image_url = format!("{}/{}", state.config.storage.public_base_url, key);
    if let Err(e) = state.http.head(&image_url).send().await {
        warn!(error = %e, image_url, "public url not reachable");
    }

    let prompt = drink_analysis_prompt(&serde_json::Value::Object(hints), &notes);
    let reply = state
        .ai
        .generate(
            &prompt,
            Some(AiImage {
                bytes,
                mime_type: content_type,
            }),
        )
        .await
        .map_err(ai_error)?;

    info!(user_id = %user_id, key, "drink submitted and analyzed");
    Ok(Json(SubmitDrinkResponse {
        image_url,
        analysis: parse_analysis(&reply),
    }))
}

#[instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    if payload.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Message field is required".into()));
    }

    let history = caffeine::repo::recent_by_user(&state.db, user_id, CHAT_HISTORY_LIMIT)
        .await
        .map_err(internal)?;
    let prompt = chat_prompt(&payload.message, &history);

    let reply = state.ai.generate(&prompt, None).await.map_err(ai_error)?;

    repo::insert_chat_message(&state.db, user_id, &payload.message, &reply)
        .await
        .map_err(internal)?;

    info!(user_id = %user_id, "chat reply sent");
    Ok(Json(ChatResponse { response: reply }))
}

#[instrument(skip(state))]
pub async fn chat_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ChatMessage>>, (StatusCode, String)> {
    let messages = repo::list_chat_messages(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(messages))
}

async fn fetch_image(state: &AppState, url: &str) -> anyhow::Result<AiImage> {
    let resp = state.http.get(url).send().await?.error_for_status()?;
    let mime_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();
    let bytes = resp.bytes().await?;
    anyhow::ensure!(!bytes.is_empty(), "image body is empty");
    Ok(AiImage { bytes, mime_type })
}

fn ai_error(e: super::client::AiError) -> (StatusCode, String) {
    error!(error = %e, "ai call failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("AI API error: {e}"),
    )
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod ai_flow_tests {
    use super::*;
    use crate::state::AppState;
    use axum::extract::FromRequest;

    async fn multipart_from(boundary: &str, body: String) -> Multipart {
        let req = axum::http::Request::builder()
            .header(
                axum::http::header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(axum::body::Body::from(body))
            .unwrap();
        Multipart::from_request(req, &()).await.unwrap()
    }

    #[tokio::test]
    async fn chat_rejects_empty_message() {
        let state = AppState::fake();
        let (status, body) = chat(
            State(state),
            AuthUser(Uuid::new_v4()),
            Json(ChatRequest {
                message: "   ".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Message"));
    }

    #[tokio::test]
    async fn analyze_drink_rejects_missing_image_url() {
        let state = AppState::fake();
        let (status, body) = analyze_drink(
            State(state),
            AuthUser(Uuid::new_v4()),
            Json(AnalyzeDrinkRequest {
                image_url: None,
                additional_inputs: serde_json::Value::Null,
                additional_notes: String::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Image URL"));
    }

    #[tokio::test]
    async fn submit_drink_rejects_missing_image_field() {
        let state = AppState::fake();
        let boundary = "test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; \
             name=\"additional_notes\"\r\n\r\nlatte\r\n--{boundary}--\r\n"
        );
        let mp = multipart_from(boundary, body).await;

        let (status, msg) = submit_drink(State(state.clone()), AuthUser(Uuid::new_v4()), mp)
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(msg.contains("image"));
        // Nothing was uploaded
        assert!(!state
            .storage
            .object_exists("drinks/anything")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn submit_drink_reports_malformed_multipart() {
        let state = AppState::fake();
        let mp = multipart_from("expected-boundary", "not a multipart body".to_string()).await;

        let (status, msg) = submit_drink(State(state), AuthUser(Uuid::new_v4()), mp)
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(msg.contains("invalid multipart body"));
    }

    #[tokio::test]
    async fn fake_ai_round_trip_parses_json_reply() {
        let state = AppState::fake();
        let reply = state
            .ai
            .generate("anything", None)
            .await
            .expect("fake ai replies");
        let parsed = parse_analysis(&reply);
        assert!(parsed.is_object());
    }

    #[tokio::test]
    async fn fake_storage_accepts_drink_upload() {
        let state = AppState::fake();
        let key = drink_image_key(Uuid::new_v4(), "image/jpeg");
        state
            .storage
            .put_object(&key, Bytes::from_static(b"jpegdata"), "image/jpeg")
            .await
            .expect("fake storage accepts uploads");
        assert!(state.storage.object_exists(&key).await.unwrap());
    }
}
