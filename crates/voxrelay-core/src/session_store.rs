//! In-memory session store. Lives for the process lifetime with no eviction.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::session::{SessionStore, Turn};

/// Process-lifetime map from session id to its ordered turns.
///
/// Each call is atomic on its own; nothing serializes a whole chat turn, so
/// concurrent requests for one session may interleave their appends.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<Turn>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_or_create(&self, session_id: &str) -> Vec<Turn> {
        if let Some(turns) = self.sessions.read().await.get(session_id) {
            return turns.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id.to_string()).or_default().clone()
    }

    async fn append(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.sessions.write().await;
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push(turn);
        debug!(session = session_id, turns = turns.len(), "Appended turn");
    }

    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
