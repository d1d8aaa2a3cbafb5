//! Shared application state for the API server.

use std::sync::Arc;

use dashmap::DashMap;
use orchestrator::service::OrchestratorService;
use tokio::sync::{Mutex, broadcast};
use tracing::debug;

/// Events broadcast to SSE clients when sessions change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    PlanCreated { session_id: String },
    TurnCompleted { session_id: String },
}

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single orchestration service for this process.
    pub service: Arc<OrchestratorService>,
    /// Broadcast sender for session change events.
    pub event_tx: Arc<broadcast::Sender<ChangeEvent>>,
    /// One async lock per session; a chat turn holds it end to end.
    turn_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl AppState {
    pub fn new(service: OrchestratorService) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            service: Arc::new(service),
            event_tx: Arc::new(event_tx),
            turn_locks: Arc::new(DashMap::new()),
        }
    }

    /// Lock serializing chat turns for `session_id`.
    pub fn turn_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.turn_locks
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Publish `event` to connected SSE clients, if any.
    pub fn publish(&self, event: ChangeEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("no SSE subscribers");
        }
    }
}
