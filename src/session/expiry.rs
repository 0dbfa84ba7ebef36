use chrono::{DateTime, Duration, Utc};

use crate::session::UploadSession;

/// Decides when an idle session may be evicted from the store
pub trait ExpiryPolicy: Send + Sync {
    fn is_expired(&self, session: &UploadSession, now: DateTime<Utc>) -> bool;
}

/// Sessions live for the lifetime of the process
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverExpire;

impl ExpiryPolicy for NeverExpire {
    fn is_expired(&self, _session: &UploadSession, _now: DateTime<Utc>) -> bool {
        false
    }
}

/// Sessions expire once they have not been read for `ttl`
#[derive(Debug, Clone, Copy)]
pub struct IdleTimeout {
    ttl: Duration,
}

impl IdleTimeout {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
        }
    }
}

impl ExpiryPolicy for IdleTimeout {
    fn is_expired(&self, session: &UploadSession, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(session.last_accessed()) >= self.ttl
    }
}

/// Policy for a configured TTL in seconds; 0 disables eviction
pub fn from_ttl_seconds(ttl_seconds: u64) -> Box<dyn ExpiryPolicy> {
    if ttl_seconds == 0 {
        Box::new(NeverExpire)
    } else {
        Box::new(IdleTimeout::new(std::time::Duration::from_secs(ttl_seconds)))
    }
}
