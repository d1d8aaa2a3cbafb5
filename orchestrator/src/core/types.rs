//! Shared value types for orchestration results and session state.
//!
//! These types define stable contracts between the service, the pipeline and
//! the transport layers. Serialized field names match the HTTP payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::context::HistoryEntry;

/// Opaque structured metadata published by an agent.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Output produced by a single agent invocation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentResult {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl AgentResult {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Result with text content and no metadata.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(content, Metadata::new())
    }
}

/// Record of one pipeline step, positionally aligned with the agent order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentExecution {
    pub agent: String,
    pub content: String,
    pub metadata: Metadata,
}

impl AgentExecution {
    pub fn from_result(agent: impl Into<String>, result: AgentResult) -> Self {
        Self {
            agent: agent.into(),
            content: result.content,
            metadata: result.metadata,
        }
    }
}

/// Mutable per-session state owned by the session store.
///
/// `plan` is fixed at creation. `history` and `artifacts` mirror the final
/// context of the last successfully completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub session_id: String,
    pub goal: String,
    pub plan: Vec<String>,
    pub history: Vec<HistoryEntry>,
    pub artifacts: BTreeMap<String, Metadata>,
}

/// Read-only view of a session's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSession {
    pub session_id: String,
    pub goal: String,
    pub plan: Vec<String>,
}

impl From<&SessionState> for PlanSession {
    fn from(state: &SessionState) -> Self {
        Self {
            session_id: state.session_id.clone(),
            goal: state.goal.clone(),
            plan: state.plan.clone(),
        }
    }
}

/// Outcome of one chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorRun {
    pub session_id: String,
    pub history: Vec<HistoryEntry>,
    pub results: Vec<AgentExecution>,
}

impl OrchestratorRun {
    /// Agent names in execution order.
    pub fn agent_names(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.agent.as_str()).collect()
    }
}
