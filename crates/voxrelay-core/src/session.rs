//! Session model: conversation turns and the session store contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who spoke a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Capitalized label used when flattening a conversation into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One recorded utterance in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Storage for per-session turn histories.
///
/// Sessions are created lazily and only ever grow. Operations cannot fail.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Snapshot of the session's turns, creating an empty session if missing.
    async fn get_or_create(&self, session_id: &str) -> Vec<Turn>;

    /// Append a turn, creating the session if missing.
    async fn append(&self, session_id: &str, turn: Turn);

    /// Number of sessions seen so far.
    async fn session_count(&self) -> usize;
}
