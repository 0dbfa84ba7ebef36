use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::generation::{truncate_chars, PROMPT_TEXT_LIMIT};
use crate::llm::{strip_code_fences, ChatModel, ResponseFormat};

pub const DEFAULT_TITLE: &str = "Study Notes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyNotes {
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub detailed_notes: String,
}

impl StudyNotes {
    /// Document returned when the model reply cannot be parsed
    pub fn fallback() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            summary: "Unable to generate summary. Please try again.".to_string(),
            key_points: vec!["Error generating notes".to_string()],
            detailed_notes: "An error occurred while generating notes. \
                             Please try uploading your files again."
                .to_string(),
        }
    }
}

pub fn build_prompt(text: &str) -> String {
    format!(
        "Generate comprehensive consolidated notes from the following text in JSON format. \
         The JSON should have exactly these fields: \
         - 'title': a clear, descriptive title for the notes \
         - 'summary': a brief summary (2-3 sentences) \
         - 'key_points': an array of important key points (3-7 items) \
         - 'detailed_notes': comprehensive detailed notes covering all important information \
         \n\nText: {}",
        truncate_chars(text, PROMPT_TEXT_LIMIT)
    )
}

/// Generate consolidated notes.
///
/// Provider failures propagate; an unparseable reply yields [`StudyNotes::fallback`].
pub async fn generate_notes(model: &dyn ChatModel, text: &str) -> Result<StudyNotes> {
    let reply = model
        .complete(&build_prompt(text), ResponseFormat::JsonObject)
        .await
        .context("Notes generation failed")?;

    Ok(parse_notes(&reply).unwrap_or_else(|e| {
        tracing::warn!("Error parsing notes JSON: {:#}", e);
        StudyNotes::fallback()
    }))
}

fn parse_notes(reply: &str) -> Result<StudyNotes> {
    let data: Value =
        serde_json::from_str(strip_code_fences(reply)).context("Notes reply is not JSON")?;
    let object = data.as_object().context("Notes reply is not a JSON object")?;

    let title = match object.get("title") {
        Some(Value::String(title)) => title.clone(),
        _ => DEFAULT_TITLE.to_string(),
    };

    let summary = match object.get("summary") {
        Some(Value::String(summary)) => summary.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let key_points = match object.get("key_points") {
        Some(Value::Array(items)) => items.iter().map(value_to_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![value_to_text(other)],
    };

    let detailed_notes = match object.get("detailed_notes") {
        Some(nested @ (Value::Object(_) | Value::Array(_))) => {
            serde_json::to_string_pretty(nested).context("Failed to render detailed notes")?
        }
        Some(Value::Null) | None => String::new(),
        Some(other) => value_to_text(other),
    };

    Ok(StudyNotes {
        title,
        summary,
        key_points,
        detailed_notes,
    })
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
