use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::generation::Difficulty;
use crate::llm::{strip_code_fences, ChatModel, ResponseFormat};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(alias = "question")]
    pub q: String,
    #[serde(alias = "answer")]
    pub a: String,
}

#[derive(Debug, Deserialize)]
struct FlashcardList {
    cards: Vec<Flashcard>,
}

pub fn build_prompt(text: &str, num_cards: usize, difficulty: Difficulty) -> String {
    format!(
        "Generate EXACTLY {num_cards} flashcards based on this text, not more or less. \
         Return a JSON object and put the flashcards inside a list under the key 'cards'. \
         Each flashcard must contain 'q' and 'a'. \
         The difficulty level of the flashcards should be {difficulty}. \
         Text:{text}"
    )
}

/// Generate `num_cards` question/answer pairs.
///
/// Provider failures and unparseable replies are returned as errors.
pub async fn generate_flashcards(
    model: &dyn ChatModel,
    text: &str,
    num_cards: usize,
    difficulty: Difficulty,
) -> Result<Vec<Flashcard>> {
    let prompt = build_prompt(text, num_cards, difficulty);
    let reply = model
        .complete(&prompt, ResponseFormat::JsonObject)
        .await
        .context("Flashcard generation failed")?;

    let mut cards = parse_flashcards(&reply)?;
    if cards.len() > num_cards {
        tracing::debug!(
            requested = num_cards,
            received = cards.len(),
            "Model returned extra flashcards; truncating"
        );
        cards.truncate(num_cards);
    }
    Ok(cards)
}

fn parse_flashcards(reply: &str) -> Result<Vec<Flashcard>> {
    let list: FlashcardList = serde_json::from_str(strip_code_fences(reply))
        .context("Model reply is not a valid flashcard list")?;
    Ok(list.cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedModel;

    #[test]
    fn test_prompt_mentions_count_and_difficulty() {
        let prompt = build_prompt("Cells divide.", 4, Difficulty::Hard);
        assert!(prompt.contains("EXACTLY 4 flashcards"));
        assert!(prompt.contains("should be hard"));
        assert!(prompt.ends_with("Text:Cells divide."));
    }

    #[tokio::test]
    async fn test_generate_flashcards() {
        let model = ScriptedModel::with_replies([
            r#"{"cards":[{"q":"Capital of France?","a":"Paris"},{"question":"Largest planet?","answer":"Jupiter"},{"q":"extra","a":"extra"}]}"#,
        ]);

        let cards = generate_flashcards(&model, "text", 2, Difficulty::Easy)
            .await
            .unwrap();

        assert_eq!(
            cards,
            vec![
                Flashcard {
                    q: "Capital of France?".to_string(),
                    a: "Paris".to_string()
                },
                Flashcard {
                    q: "Largest planet?".to_string(),
                    a: "Jupiter".to_string()
                },
            ]
        );
        assert_eq!(model.prompts()[0].1, ResponseFormat::JsonObject);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_an_error() {
        let model = ScriptedModel::with_replies(["here are your cards!"]);
        let result = generate_flashcards(&model, "text", 3, Difficulty::Medium).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let model = ScriptedModel::new();
        model.push_error("503");
        let result = generate_flashcards(&model, "text", 3, Difficulty::Medium).await;
        assert!(result.is_err());
    }
}
