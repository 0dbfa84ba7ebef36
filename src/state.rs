use std::sync::Arc;

use crate::{config::Config, ingestion::Embedder, llm::ChatModel, session::SessionStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    pub llm: Arc<dyn ChatModel>,
    pub embedder: Arc<dyn Embedder>,
}

impl AppState {
    pub fn new(
        config: Config,
        sessions: Arc<SessionStore>,
        llm: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            config,
            sessions,
            llm,
            embedder,
        }
    }
}
