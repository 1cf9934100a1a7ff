use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

use super::session::Session;

/// Shared handle to one session; the mutex serializes that session's actions
pub type SessionHandle = Arc<Mutex<Session>>;

/// Sessions untouched for this long are dropped
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Live sessions keyed by session ID
///
/// Every lookup refreshes the session's last-seen time. Sessions idle for
/// longer than the TTL are evicted, together with any recording they hold,
/// unless a request is still using them.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(session_id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.handle))
    }

    /// Return the session for `session_id`, or create a new one when the ID
    /// is missing or unknown. The returned flag is true for a new session.
    pub async fn get_or_create(&self, session_id: Option<&str>) -> (String, SessionHandle, bool) {
        if let Some(id) = session_id {
            if let Some(handle) = self.get(id).await {
                return (id.to_string(), handle, false);
            }
        }

        self.evict_idle().await;

        let id = uuid::Uuid::new_v4().to_string();
        let handle = Arc::new(Mutex::new(Session::new(id.clone())));

        {
            let mut sessions = self.sessions.write().await;
            sessions.insert(
                id.clone(),
                Entry {
                    handle: Arc::clone(&handle),
                    last_seen: Instant::now(),
                },
            );
        }

        info!("Created session {}", id);
        (id, handle, true)
    }

    /// Drop sessions idle past the TTL. Returns how many were removed.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, entry| {
            // A handle cloned out by a request still in flight
            let in_use = Arc::strong_count(&entry.handle) > 1;
            let keep = in_use || entry.last_seen.elapsed() < self.idle_ttl;
            if !keep {
                debug!("Evicting idle session {}", id);
            }
            keep
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle sessions, {} remain", evicted, sessions.len());
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
