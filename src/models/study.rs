use serde::{Deserialize, Serialize};

use crate::generation::{Flashcard, QuizQuestion, StudyNotes};

/// Flashcard generation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub file_id: String,
    pub num_cards: Option<i64>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub cards: Vec<Flashcard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesRequest {
    pub file_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesResponse {
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub detailed_notes: String,
}

impl From<StudyNotes> for NotesResponse {
    fn from(notes: StudyNotes) -> Self {
        Self {
            title: notes.title,
            summary: notes.summary,
            key_points: notes.key_points,
            detailed_notes: notes.detailed_notes,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub file_id: String,
    pub num_questions: Option<i64>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionDto {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

impl From<QuizQuestion> for QuizQuestionDto {
    fn from(q: QuizQuestion) -> Self {
        Self {
            question: q.question,
            options: q.options,
            correct_answer: q.correct_answer,
            explanation: q.explanation,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestionDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_use_camel_case() {
        let req: QuizRequest =
            serde_json::from_str(r#"{"fileId":"abc","numQuestions":3,"difficulty":"hard"}"#)
                .unwrap();
        assert_eq!(req.file_id, "abc");
        assert_eq!(req.num_questions, Some(3));
        assert_eq!(req.difficulty.as_deref(), Some("hard"));

        let req: GenerateRequest = serde_json::from_str(r#"{"fileId":"abc"}"#).unwrap();
        assert!(req.num_cards.is_none());
        assert!(req.difficulty.is_none());
    }

    #[test]
    fn test_notes_response_shape() {
        let json = serde_json::to_value(NotesResponse::from(StudyNotes::fallback())).unwrap();
        assert_eq!(json["title"], "Study Notes");
        assert_eq!(json["keyPoints"][0], "Error generating notes");
        assert!(json.get("detailedNotes").is_some());
    }
}
