use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, TimeZone, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::ingestion::processor::remove_file_logged;
use crate::ingestion::Chunk;
use crate::search::VectorIndex;
use crate::session::ExpiryPolicy;

/// Everything derived from one upload batch
#[derive(Debug)]
pub struct UploadSession {
    pub id: Uuid,
    pub file_paths: Vec<PathBuf>,
    pub chunks: Vec<Chunk>,
    pub filenames: Vec<String>,
    pub created_at: DateTime<Utc>,
    last_accessed_ms: AtomicI64,
    vector_index: OnceLock<Arc<VectorIndex>>,
}

impl UploadSession {
    fn new(id: Uuid, file_paths: Vec<PathBuf>, chunks: Vec<Chunk>, filenames: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            file_paths,
            chunks,
            filenames,
            created_at: now,
            last_accessed_ms: AtomicI64::new(now.timestamp_millis()),
            vector_index: OnceLock::new(),
        }
    }

    /// All chunk contents joined by single spaces, trimmed
    pub fn combined_text(&self) -> String {
        self.chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    pub fn vector_index(&self) -> Option<Arc<VectorIndex>> {
        self.vector_index.get().cloned()
    }

    pub fn last_accessed(&self) -> DateTime<Utc> {
        let ms = self.last_accessed_ms.load(Ordering::Relaxed);
        Utc.timestamp_millis_opt(ms).single().unwrap_or(self.created_at)
    }

    fn touch(&self, now: DateTime<Utc>) {
        self.last_accessed_ms
            .fetch_max(now.timestamp_millis(), Ordering::Relaxed);
    }
}

/// Process-wide store of upload sessions keyed by a generated id.
///
/// Sessions are only removed by [`SessionStore::evict_expired`], under the
/// injected [`ExpiryPolicy`].
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<UploadSession>>,
    policy: Box<dyn ExpiryPolicy>,
}

impl SessionStore {
    pub fn new(policy: Box<dyn ExpiryPolicy>) -> Self {
        Self {
            sessions: DashMap::new(),
            policy,
        }
    }

    /// Store a new session under a fresh id. Existing ids are never overwritten.
    pub fn create(
        &self,
        file_paths: Vec<PathBuf>,
        chunks: Vec<Chunk>,
        filenames: Vec<String>,
    ) -> Uuid {
        loop {
            let id = Uuid::new_v4();
            match self.sessions.entry(id) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(UploadSession::new(id, file_paths, chunks, filenames)));
                    tracing::info!(session_id = %id, "Created upload session");
                    return id;
                }
            }
        }
    }

    /// Look up a session and refresh its last-access time
    pub fn get(&self, id: &Uuid) -> Option<Arc<UploadSession>> {
        let session = self.sessions.get(id)?.value().clone();
        session.touch(Utc::now());
        Some(session)
    }

    /// Parse `raw_id` and look it up; malformed ids are simply absent
    pub fn get_str(&self, raw_id: &str) -> Option<Arc<UploadSession>> {
        let id = Uuid::parse_str(raw_id.trim()).ok()?;
        self.get(&id)
    }

    /// Attach a vector index to a session. Only the first call per session has
    /// effect; the index that ends up attached is returned.
    pub fn attach_vector_index(
        &self,
        id: &Uuid,
        index: Arc<VectorIndex>,
    ) -> Option<Arc<VectorIndex>> {
        let session = self.sessions.get(id)?.value().clone();
        Some(attach_once(&session, index))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every session the policy considers expired and delete its temp files.
    /// Returns the number of sessions removed.
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Utc::now())
    }

    pub fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|entry| self.policy.is_expired(entry.value(), now))
            .map(|entry| *entry.key())
            .collect();

        let mut removed = 0;
        for id in expired {
            // Re-check under the shard lock; a concurrent read may have refreshed it
            if let Some((_, session)) = self
                .sessions
                .remove_if(&id, |_, session| self.policy.is_expired(session, now))
            {
                for path in &session.file_paths {
                    remove_file_logged(path);
                }
                tracing::info!(session_id = %id, "Evicted expired upload session");
                removed += 1;
            }
        }
        removed
    }
}

/// First-writer-wins attach used by the lazy build path
pub fn attach_once(session: &UploadSession, index: Arc<VectorIndex>) -> Arc<VectorIndex> {
    if session.vector_index.set(index).is_err() {
        tracing::debug!(
            session_id = %session.id,
            "Vector index already attached; keeping the first"
        );
    }
    session
        .vector_index
        .get()
        .cloned()
        .unwrap_or_default()
}
