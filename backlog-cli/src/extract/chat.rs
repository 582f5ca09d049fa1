//! Extraction through an OpenAI-compatible chat completion endpoint

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ExtractionRequest, RowExtractor};
use crate::import::{CandidateRecord, CanonicalField, Value, coerce};

/// Connection settings for the chat endpoint
#[derive(Debug, Clone)]
pub struct ChatExtractorConfig {
    /// Base URL up to and including the API version, e.g. `https://host/v1`
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

pub struct ChatExtractor {
    client: reqwest::Client,
    config: ChatExtractorConfig,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ChatExtractor {
    pub fn new(config: ChatExtractorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RowExtractor for ChatExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<Option<CandidateRecord>> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system_prompt(request)},
                {"role": "user", "content": user_message(request)},
            ],
            "response_format": {"type": "json_object"},
        });

        let mut http = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            http = http.bearer_auth(key);
        }

        let response = http
            .send()
            .await
            .context("Extraction request failed")?
            .error_for_status()
            .context("Extraction endpoint returned an error")?;

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Extraction response is not a chat completion")?;

        let Some(content) = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
        else {
            log::warn!("Empty extraction response");
            return Ok(None);
        };

        parse_record(&content, request)
    }
}

/// Validate the model's JSON object into a record with the forced status
fn parse_record(content: &str, request: &ExtractionRequest) -> Result<Option<CandidateRecord>> {
    let data: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(strip_code_fence(content))
            .context("Extraction response is not a JSON object")?;

    let mut record = CandidateRecord::new();
    for (key, raw) in &data {
        let Some(field) = CanonicalField::parse(key) else {
            log::debug!("Ignoring unknown extracted field '{}'", key);
            continue;
        };
        let value = coerce(field, &json_to_value(raw))
            .with_context(|| format!("Extracted value for {} is invalid", field))?;
        record.set(field, value);
    }
    record.set(CanonicalField::Status, request.target_status.into());

    if record.title().is_none() {
        return Ok(None);
    }
    Ok(Some(record))
}

fn json_to_value(raw: &serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or_default(),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn system_prompt(request: &ExtractionRequest) -> String {
    let mut prompt = format!(
        "You are a data parsing assistant for a videogame collection tracker.
You receive the column names and values of one spreadsheet row and return the
game it describes as a single JSON object with these keys:

- title (string, required)
- status (\"backlog\" or \"finished\")
- hype_score (integer 1-10)
- rating (number)
- progress (one of \"Empezado\", \"A mitad\", \"Avanzado\", \"Terminado\")
- playtime_hours (number)
- finish_year (four-digit integer)
- release_year (four-digit integer)
- price (number)
- platform (string)
- steam_deck (boolean)
- notes (string)

Rules:
- \"status\" MUST be \"{}\".
- Only include fields you can determine from the row; never invent data.
- Cell colors, when given, are hex RGB fills the author used as markers.
- Return only the JSON object, no markdown, no explanation.",
        request.target_status
    );

    if let Some(instructions) = request.instructions.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str("\n\nAdditional instructions from the user:\n");
        prompt.push_str(instructions);
    }
    prompt
}

fn user_message(request: &ExtractionRequest) -> String {
    let mut lines = vec!["Here is the row data:".to_string()];
    for (idx, header) in request.headers.iter().enumerate() {
        let value = request.values.get(idx).cloned().unwrap_or_default();
        if value.is_null() {
            continue;
        }
        match request.colors.get(idx).and_then(|c| c.as_deref()) {
            Some(color) => lines.push(format!("- {}: {} (color #{})", header, value, color)),
            None => lines.push(format!("- {}: {}", header, value)),
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::GameStatus;

    fn request() -> ExtractionRequest {
        ExtractionRequest {
            headers: vec!["Juego".into(), "Nota".into(), "Vacío".into()],
            values: vec![Value::from("Hades"), Value::Int(9), Value::Null],
            target_status: GameStatus::Finished,
            instructions: Some("Nota is out of 10".into()),
            colors: vec![None, Some("00FF00".into()), None],
        }
    }

    #[test]
    fn test_parse_record_forces_status_and_coerces() {
        let record = parse_record(
            r#"{"title": "Hades", "status": "backlog", "rating": 9, "finish_year": "2021", "mood": "good"}"#,
            &request(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(record.get(CanonicalField::Status), Some(&Value::from("finished")));
        assert_eq!(record.get(CanonicalField::Rating), Some(&Value::Float(9.0)));
        assert_eq!(record.get(CanonicalField::FinishYear), Some(&Value::Int(2021)));
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_parse_record_without_title_is_none() {
        assert!(parse_record(r#"{"rating": 9}"#, &request()).unwrap().is_none());
    }

    #[test]
    fn test_parse_record_rejects_invalid_values() {
        assert!(parse_record(r#"{"title": "Hades", "progress": "half"}"#, &request()).is_err());
        assert!(parse_record("not json", &request()).is_err());
    }

    #[test]
    fn test_parse_record_accepts_fenced_json() {
        let record = parse_record("```json\n{\"title\": \"Hades\"}\n```", &request())
            .unwrap()
            .unwrap();
        assert_eq!(record.title(), Some("Hades".to_string()));
    }

    #[test]
    fn test_prompts_carry_row_details() {
        let req = request();
        let system = system_prompt(&req);
        assert!(system.contains("MUST be \"finished\""));
        assert!(system.contains("Nota is out of 10"));

        let user = user_message(&req);
        assert!(user.contains("- Juego: Hades"));
        assert!(user.contains("- Nota: 9 (color #00FF00)"));
        assert!(!user.contains("Vacío"));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let extractor = ChatExtractor::new(ChatExtractorConfig {
            base_url: "https://api.example.com/v1/".into(),
            model: "m".into(),
            api_key: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(extractor.endpoint(), "https://api.example.com/v1/chat/completions");
    }
}
