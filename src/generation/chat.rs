use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::ingestion::Embedder;
use crate::llm::{ChatModel, ResponseFormat};
use crate::search::VectorIndex;

/// Chunks retrieved per question
pub const CONTEXT_CHUNKS: usize = 3;

const UNKNOWN_SOURCE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    /// Sorted, comma-separated filenames; empty when nothing was retrieved
    pub sources: String,
}

fn contextual_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful and friendly AI study assistant. Answer the following question \
         based on the context provided. Be conversational, clear, and helpful. If the question \
         is a greeting or casual conversation, respond warmly. If the answer is not in the \
         context, politely say so and offer to help with something else.\n\n\
         Context from the documents:\n{context}\n\n\
         Question: {question}\n\n\
         Answer:"
    )
}

fn conversational_prompt(question: &str) -> String {
    format!(
        "You are a helpful and friendly AI study assistant. The user said: '{question}'. \
         Respond in a warm, conversational way. If it's a greeting, greet them back. \
         If it's a question you can't answer without the documents, politely explain that \
         and ask if they have questions about their uploaded materials."
    )
}

/// Answer `question` from the chunks nearest to it in `index`.
///
/// Chunks scoring zero are dropped. With no retrieved context the model is
/// still asked for a conversational reply and `sources` is empty.
pub async fn answer_question(
    model: &dyn ChatModel,
    embedder: &dyn Embedder,
    index: &VectorIndex,
    question: &str,
) -> Result<ChatAnswer> {
    // A chunk sharing no terms with the question is not context
    let results: Vec<_> = index
        .similarity_search(embedder, question, CONTEXT_CHUNKS)
        .await
        .context("Similarity search failed")?
        .into_iter()
        .filter(|r| r.score > 0.0)
        .collect();

    let context = results
        .iter()
        .map(|r| r.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let sources: BTreeSet<&str> = results
        .iter()
        .map(|r| r.chunk.metadata.source.as_str())
        .filter(|s| !s.is_empty() && *s != UNKNOWN_SOURCE)
        .collect();

    let prompt = if context.is_empty() {
        conversational_prompt(question)
    } else {
        contextual_prompt(&context, question)
    };

    let reply = model
        .complete(&prompt, ResponseFormat::Text)
        .await
        .context("Chat completion failed")?;

    Ok(ChatAnswer {
        answer: reply.trim().to_string(),
        sources: sources.into_iter().collect::<Vec<_>>().join(", "),
    })
}
