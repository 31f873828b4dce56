use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::KnowledgeBase;
use crate::domain::repositories::AssistantStorage;

/// Per-browser state that survives between render passes.
#[derive(Default, Clone)]
pub struct UiSessionState {
    pub knowledge_base: Option<Arc<KnowledgeBase>>,
    pub storage: Option<Arc<dyn AssistantStorage>>,
}

impl UiSessionState {
    pub fn is_ready(&self) -> bool {
        self.knowledge_base.is_some() && self.storage.is_some()
    }
}

impl std::fmt::Debug for UiSessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiSessionState")
            .field("knowledge_base", &self.knowledge_base)
            .field("storage", &self.storage.is_some())
            .finish()
    }
}

pub type SharedSessionState = Arc<Mutex<UiSessionState>>;

/// Upper bound on UI sessions kept in memory at once.
pub const MAX_UI_SESSIONS: usize = 10_000;

struct SessionEntry {
    state: SharedSessionState,
    last_seen: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<String, SessionEntry>,
    clock: u64,
}

impl Sessions {
    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_seen)
            .map(|(id, _)| id.clone());

        if let Some(id) = oldest {
            tracing::debug!("Evicting idle UI session {}", id);
            self.entries.remove(&id);
        }
    }
}

/// Process-wide map from UI session ID to its state. Sessions are never torn
/// down explicitly; once `capacity` is reached the least recently used one
/// makes room for a new ID.
pub struct SessionStore {
    sessions: Mutex<Sessions>,
    capacity: usize,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_UI_SESSIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    /// Returns the state for `session_id`, creating it on first sight. A
    /// missing or blank ID gets a freshly minted one.
    pub async fn entry(&self, session_id: Option<&str>) -> (String, SharedSessionState) {
        let session_id = match session_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };

        let mut sessions = self.sessions.lock().await;
        sessions.clock += 1;
        let now = sessions.clock;

        if !sessions.entries.contains_key(&session_id) && sessions.entries.len() >= self.capacity {
            sessions.evict_least_recent();
        }

        let entry = sessions
            .entries
            .entry(session_id.clone())
            .or_insert_with(|| {
                tracing::debug!("Creating UI session {}", session_id);
                SessionEntry {
                    state: Arc::new(Mutex::new(UiSessionState::default())),
                    last_seen: now,
                }
            });
        entry.last_seen = now;

        (session_id, entry.state.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.entries.len()
    }
}
