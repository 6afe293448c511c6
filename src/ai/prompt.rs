use crate::caffeine::repo::CaffeineLog;

/// Prompt for estimating nutrition from a drink photo, embedding any
/// caller-supplied hints and free-text notes.
pub fn drink_analysis_prompt(
    additional_inputs: &serde_json::Value,
    additional_notes: &str,
) -> String {
    format!(
        "I will send you an image of a drink. \
         Return a JSON object with nutritional details including the estimated \
         amount of caffeine and sugar. \
         If you cannot determine details from the image, estimate them based on \
         known drink data. \
         Additional notes: {}. Optional inputs: {}",
        additional_notes, additional_inputs
    )
}

/// Prompt for free-text wellness chat, personalized with the requester's
/// recent caffeine history.
pub fn chat_prompt(message: &str, history: &[CaffeineLog]) -> String {
    let mut prompt = String::new();
    if !history.is_empty() {
        prompt.push_str("The user's recent caffeine intake:\n");
        for log in history {
            prompt.push_str(&history_line(log));
            prompt.push('\n');
        }
    }
    prompt.push_str(&format!(
        "User says: {}\nProvide a helpful and personalized response regarding \
         caffeine intake and wellness.",
        message
    ));
    prompt
}

fn history_line(log: &CaffeineLog) -> String {
    let name = log.beverage_name.as_deref().unwrap_or("unknown drink");
    format!(
        "- {} mg of caffeine ({}) at {}",
        log.caffeine_mg, name, log.created_at
    )
}

#[cfg(test)]
mod prompt_tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn sample_log(name: Option<&str>, mg: f64) -> CaffeineLog {
        CaffeineLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            caffeine_mg: mg,
            beverage_name: name.map(|s| s.to_string()),
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
    fn analysis_prompt_embeds_hints_and_notes() {
        let hints = serde_json::json!({ "sugar_content_g": 12.0 });
        let prompt = drink_analysis_prompt(&hints, "double shot");
        assert!(prompt.contains("double shot"));
        assert!(prompt.contains("sugar_content_g"));
        assert!(prompt.contains("JSON object"));
    }

    #[test]
    fn chat_prompt_includes_history_lines() {
        let history = vec![sample_log(Some("Espresso"), 63.0), sample_log(None, 80.0)];
        let prompt = chat_prompt("How am I doing?", &history);
        assert!(prompt.contains("63 mg of caffeine (Espresso)"));
        assert!(prompt.contains("unknown drink"));
        assert!(prompt.contains("User says: How am I doing?"));
    }

    #[test]
    fn chat_prompt_without_history_has_no_intake_section() {
        let prompt = chat_prompt("hello", &[]);
        assert!(!prompt.contains("recent caffeine intake"));
        assert!(prompt.starts_with("User says: hello"));
    }
}
