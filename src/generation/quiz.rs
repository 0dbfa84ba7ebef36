use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::generation::{truncate_chars, Difficulty, PROMPT_TEXT_LIMIT};
use crate::llm::{strip_code_fences, ChatModel, ResponseFormat};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

pub fn build_prompt(text: &str, num_questions: usize, difficulty: Difficulty) -> String {
    format!(
        "Generate EXACTLY {} multiple-choice quiz questions based on this text. \
         The difficulty level should be {}. \
         Return a JSON object with a 'questions' array. Each question must have: \
         - 'question': the question text \
         - 'options': an array of exactly 4 answer options \
         - 'correct_answer': the correct answer (must match one of the options exactly) \
         - 'explanation': a brief explanation of why this is the correct answer \
         \n\nText: {}",
        num_questions,
        difficulty,
        truncate_chars(text, PROMPT_TEXT_LIMIT)
    )
}

/// Generate a multiple-choice quiz.
///
/// Provider failures propagate; an unparseable reply yields an empty quiz.
pub async fn generate_quiz(
    model: &dyn ChatModel,
    text: &str,
    num_questions: usize,
    difficulty: Difficulty,
) -> Result<Vec<QuizQuestion>> {
    let reply = model
        .complete(&build_prompt(text, num_questions, difficulty), ResponseFormat::JsonObject)
        .await
        .context("Quiz generation failed")?;

    let mut questions = parse_quiz(&reply).unwrap_or_else(|e| {
        tracing::warn!("Error parsing quiz JSON: {:#}", e);
        Vec::new()
    });
    questions.truncate(num_questions);
    Ok(questions)
}

fn parse_quiz(reply: &str) -> Result<Vec<QuizQuestion>> {
    let data: Value =
        serde_json::from_str(strip_code_fences(reply)).context("Quiz reply is not JSON")?;
    let object = data.as_object().context("Quiz reply is not a JSON object")?;

    let items: &[Value] = match object.get("questions") {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Null) | None => &[],
        Some(_) => anyhow::bail!("'questions' is not an array"),
    };

    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .map(|q| QuizQuestion {
            question: text_field(q.get("question")),
            options: match q.get("options") {
                Some(Value::Array(options)) => {
                    options.iter().map(|o| text_field(Some(o))).collect()
                }
                _ => Vec::new(),
            },
            correct_answer: text_field(q.get("correct_answer")),
            explanation: text_field(q.get("explanation")),
        })
        .collect())
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
