use serde::{Deserialize, Serialize};

/// Body for analyzing an already-hosted drink image.
#[derive(Debug, Deserialize)]
pub struct AnalyzeDrinkRequest {
    pub image_url: Option<String>,
    #[serde(default)]
    pub additional_inputs: serde_json::Value,
    #[serde(default)]
    pub additional_notes: String,
}

/// Body for free-text wellness chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Returned by submit-drink: where the image landed plus the model's
/// parsed-or-raw estimate.
#[derive(Debug, Serialize)]
pub struct SubmitDrinkResponse {
    pub image_url: String,
    pub analysis: serde_json::Value,
}

#[cfg(test)]
mod dto_tests {
    use super::*;

    #[test]
    fn analyze_request_defaults() {
        let req: AnalyzeDrinkRequest = serde_json::from_str("{}").unwrap();
        assert!(req.image_url.is_none());
        assert!(req.additional_inputs.is_null());
        assert!(req.additional_notes.is_empty());
    }

    #[test]
    fn analyze_request_with_hints() {
        let req: AnalyzeDrinkRequest = serde_json::from_str(
            r#"{"image_url": "https://cdn.example.com/x.jpg",
                "additional_inputs": {"beverage_size_ml": 330},
                "additional_notes": "energy drink"}"#,
        )
        .unwrap();
        assert_eq!(req.image_url.as_deref(), Some("https://cdn.example.com/x.jpg"));
        assert_eq!(req.additional_inputs["beverage_size_ml"], 330);
        assert_eq!(req.additional_notes, "energy drink");
    }

    #[test]
    fn chat_request_message_defaults_to_empty() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_empty());
    }
}
