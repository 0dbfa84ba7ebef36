use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::{
    errors::{AppError, Result},
    export::{build_notes_docx, notes_filename, DOCX_CONTENT_TYPE},
    generation::{self, normalize_count, Difficulty},
    models::{
        GenerateRequest, GenerateResponse, NotesRequest, NotesResponse, QuizRequest, QuizResponse,
    },
    routes::load_session,
    session::{ensure_vector_index, UploadSession},
    state::AppState,
};

const DEFAULT_NUM_CARDS: usize = 10;
const DEFAULT_NUM_QUESTIONS: usize = 5;

/// Generate flashcards from a session's documents
pub async fn generate_flashcards(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let session = load_session(&state, &payload.file_id)?;
    let text = session_text(&session, "flashcard generation")?;

    let num_cards = normalize_count(payload.num_cards, DEFAULT_NUM_CARDS);
    let difficulty = Difficulty::normalize(payload.difficulty.as_deref());

    let cards =
        generation::generate_flashcards(state.llm.as_ref(), &text, num_cards, difficulty).await?;
    warm_vector_index(&state, &session).await;

    Ok(Json(GenerateResponse { cards }))
}

/// Generate consolidated notes from a session's documents
pub async fn generate_notes(
    State(state): State<AppState>,
    Json(payload): Json<NotesRequest>,
) -> Result<Json<NotesResponse>> {
    let session = load_session(&state, &payload.file_id)?;
    let text = session_text(&session, "notes generation")?;

    let notes = generation::generate_notes(state.llm.as_ref(), &text).await?;
    warm_vector_index(&state, &session).await;

    Ok(Json(notes.into()))
}

/// Generate a multiple-choice quiz from a session's documents
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(payload): Json<QuizRequest>,
) -> Result<Json<QuizResponse>> {
    let session = load_session(&state, &payload.file_id)?;
    let text = session_text(&session, "quiz generation")?;

    let num_questions = normalize_count(payload.num_questions, DEFAULT_NUM_QUESTIONS);
    let difficulty = Difficulty::normalize(payload.difficulty.as_deref());

    let questions =
        generation::generate_quiz(state.llm.as_ref(), &text, num_questions, difficulty).await?;
    warm_vector_index(&state, &session).await;

    Ok(Json(QuizResponse {
        questions: questions.into_iter().map(Into::into).collect(),
    }))
}

/// Generate notes and return them as a Word document attachment
pub async fn download_notes(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse> {
    let session = load_session(&state, &file_id)?;
    let text = session_text(&session, "notes generation")?;

    let notes = generation::generate_notes(state.llm.as_ref(), &text).await?;
    let document = build_notes_docx(&notes)?;

    let disposition = format!("attachment; filename={}", notes_filename(&notes.title));
    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    ))
}

fn session_text(session: &UploadSession, purpose: &str) -> Result<String> {
    let text = session.combined_text();
    if text.is_empty() {
        return Err(AppError::Unprocessable(format!(
            "No text found for {}.",
            purpose
        )));
    }
    Ok(text)
}

/// Build the session's vector index ahead of the first chat request.
/// Failures are logged; chat retries the build.
async fn warm_vector_index(state: &AppState, session: &UploadSession) {
    if let Err(e) = ensure_vector_index(session, state.embedder.as_ref()).await {
        tracing::warn!(session_id = %session.id, "Failed to build vector index: {:#}", e);
    }
}
