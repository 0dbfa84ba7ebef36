pub mod chat;
pub mod health;
pub mod study;
pub mod upload;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::{
    errors::{AppError, Result},
    session::UploadSession,
    state::AppState,
};

/// Creates the main router: the JSON API under /api, plus the single-page
/// frontend when a static directory is configured
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes();
    let static_dir = state.config.server.static_dir.clone();

    let router = Router::new()
        .nest("/api", api_routes(state))
        .layer(DefaultBodyLimit::max(body_limit));

    match static_dir {
        Some(dir) => router.fallback_service(spa_service(&dir)),
        None => router,
    }
}

/// API routes under /api prefix
fn api_routes(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .route("/upload", post(upload::upload_files))
        .route("/generate", post(study::generate_flashcards))
        .route("/generate-notes", post(study::generate_notes))
        .route("/generate-quiz", post(study::generate_quiz))
        .route("/download-notes/:file_id", get(study::download_notes))
        .route("/chat", post(chat::chat))
        // Unknown API paths never fall through to the frontend
        .fallback(api_not_found)
        .with_state(state)
}

async fn api_not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// Static files, with index.html served for any path that is not a file
fn spa_service(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}

/// Resolve a request's `fileId` to its session
pub(crate) fn load_session(state: &AppState, file_id: &str) -> Result<Arc<UploadSession>> {
    state
        .sessions
        .get_str(file_id)
        .ok_or_else(AppError::session_not_found)
}
