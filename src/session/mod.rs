pub mod expiry;
pub mod store;

pub use expiry::{ExpiryPolicy, IdleTimeout, NeverExpire};
pub use store::{attach_once, SessionStore, UploadSession};

use std::sync::Arc;
use std::time::Duration;

use crate::ingestion::Embedder;
use crate::search::VectorIndex;

/// Periodically evict expired sessions for as long as the process runs
pub fn spawn_eviction_task(
    store: Arc<SessionStore>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.evict_expired();
            if removed > 0 {
                tracing::info!(
                    removed,
                    remaining = store.len(),
                    "Session sweep evicted expired sessions"
                );
            }
        }
    })
}

/// Return the session's vector index, building and attaching it on first use.
///
/// Concurrent first requests may both build; the first attach wins and the
/// other index is dropped.
pub async fn ensure_vector_index(
    session: &UploadSession,
    embedder: &dyn Embedder,
) -> anyhow::Result<Arc<VectorIndex>> {
    if let Some(index) = session.vector_index() {
        return Ok(index);
    }

    let started = std::time::Instant::now();
    let index = VectorIndex::build(embedder, &session.chunks).await?;
    tracing::info!(
        session_id = %session.id,
        chunks = index.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Built vector index"
    );

    Ok(attach_once(session, Arc::new(index)))
}
