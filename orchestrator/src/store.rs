//! In-memory session store.
//!
//! The store is the single source of truth for a session's plan, history and
//! artifacts between chat turns. Entries live for the lifetime of the process.
//!
//! Operations on different sessions are safe to run concurrently. Concurrent
//! read-modify-write of the *same* session is not coordinated here: callers
//! must keep at most one turn in flight per session id.

use dashmap::DashMap;
use tracing::debug;

use crate::core::types::SessionState;
use crate::error::OrchestratorError;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the session state.
    pub fn get(&self, session_id: &str) -> Result<SessionState, OrchestratorError> {
        match self.sessions.get(session_id) {
            Some(entry) => Ok(entry.value().clone()),
            None => {
                debug!(session_id, "session lookup missed");
                Err(OrchestratorError::SessionNotFound(session_id.to_string()))
            }
        }
    }

    /// Store `state` under its own session id, replacing any previous state.
    pub fn put(&self, state: SessionState) {
        debug!(
            session_id = %state.session_id,
            history_len = state.history.len(),
            artifacts = state.artifacts.len(),
            "storing session state"
        );
        self.sessions.insert(state.session_id.clone(), state);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
