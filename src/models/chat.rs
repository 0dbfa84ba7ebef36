use serde::{Deserialize, Serialize};

use crate::generation::ChatAnswer;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub file_id: String,
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: String,
}

impl From<ChatAnswer> for ChatResponse {
    fn from(answer: ChatAnswer) -> Self {
        Self {
            answer: answer.answer,
            sources: answer.sources,
        }
    }
}
