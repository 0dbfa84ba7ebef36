use axum::{extract::State, Json};

use crate::{
    errors::{AppError, Result},
    generation::answer_question,
    models::{ChatRequest, ChatResponse},
    routes::load_session,
    session::ensure_vector_index,
    state::AppState,
};

/// Answer a question from the session's most relevant chunks
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let session = load_session(&state, &payload.file_id)?;

    let question = payload.question.trim();
    if question.is_empty() {
        return Err(AppError::BadRequest("Question cannot be empty.".to_string()));
    }

    let index = ensure_vector_index(&session, state.embedder.as_ref()).await?;
    let answer = answer_question(
        state.llm.as_ref(),
        state.embedder.as_ref(),
        &index,
        question,
    )
    .await?;

    tracing::debug!(
        session_id = %session.id,
        sources = %answer.sources,
        "Answered chat question"
    );

    Ok(Json(answer.into()))
}
