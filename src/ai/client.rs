use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use serde_json::json;
use tracing::debug;

/// Image handed to the model alongside the prompt.
pub struct AiImage {
    pub bytes: Bytes,
    pub mime_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("ai transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("ai api error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("ai response contained no text")]
    EmptyResponse,
}

#[async_trait]
pub trait AiClient: Send + Sync {
    /// Send one prompt (optionally with an inline image) and return the
    /// model's raw text reply.
    async fn generate(&self, prompt: &str, image: Option<AiImage>) -> Result<String, AiError>;
}

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: &str, model: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn generate(&self, prompt: &str, image: Option<AiImage>) -> Result<String, AiError> {
        let mut parts = vec![json!({ "text": prompt })];
        if let Some(img) = image {
            let data = base64::engine::general_purpose::STANDARD.encode(&img.bytes);
            parts.push(json!({
                "inline_data": { "mime_type": img.mime_type, "data": data }
            }));
        }
        let body = json!({ "contents": [{ "parts": parts }] });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let resp = self.http.post(&url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = resp.json().await?;
        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(AiError::EmptyResponse)?
            .to_string();
        debug!(model = %self.model, reply_len = text.len(), "gemini reply");
        Ok(text)
    }
}

/// Best-effort decode of the model's text reply. Models often wrap JSON in
/// markdown fences; strip those first, then fall back to a raw-text envelope.
pub fn parse_analysis(text: &str) -> serde_json::Value {
    let cleaned = text
        .trim()
        .strip_prefix("```json")
        .or_else(|| text.trim().strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(text)
        .trim();
    match serde_json::from_str::<serde_json::Value>(cleaned) {
        Ok(v) => v,
        Err(_) => json!({ "raw_response": text }),
    }
}

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn well_formed_json_is_returned_as_is() {
        let reply = r#"{"beverage_name": "Cold Brew", "caffeine_mg": 200.0}"#;
        let parsed = parse_analysis(reply);
        assert_eq!(parsed["beverage_name"], "Cold Brew");
        assert_eq!(parsed["caffeine_mg"], 200.0);
        assert!(parsed.get("raw_response").is_none());
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let reply = "```json\n{\"caffeine_mg\": 80}\n```";
        let parsed = parse_analysis(reply);
        assert_eq!(parsed["caffeine_mg"], 80);
    }

    #[test]
    fn non_json_reply_is_wrapped_as_raw_response() {
        let reply = "Sorry, I could not identify the drink.";
        let parsed = parse_analysis(reply);
        assert_eq!(parsed["raw_response"], reply);
    }

    #[test]
    fn empty_reply_is_wrapped_as_raw_response() {
        let parsed = parse_analysis("");
        assert_eq!(parsed["raw_response"], "");
    }
}
