//! Caller-visible error taxonomy for orchestration operations.

/// Errors surfaced by [`crate::service::OrchestratorService`].
///
/// Agent-internal failures never appear here: agents absorb them with their
/// deterministic fallbacks. `AgentFailed` is reserved for an agent that
/// raised anyway, which is fatal for the current turn.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("unknown session_id: {0}")]
    SessionNotFound(String),

    #[error("agent '{0}' has not been registered")]
    UnknownAgent(String),

    #[error("agent '{agent}' failed: {source}")]
    AgentFailed {
        agent: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl OrchestratorError {
    pub(crate) fn agent_failed(agent: &str, err: anyhow::Error) -> Self {
        Self::AgentFailed {
            agent: agent.to_string(),
            source: err.into(),
        }
    }

    /// True for errors the caller caused (unknown session), as opposed to
    /// server-side faults.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound(_))
    }
}
