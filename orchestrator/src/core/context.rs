//! Immutable execution context threaded through every agent invocation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::Metadata;

/// Role recorded for messages that come from the end user.
pub const USER_ROLE: &str = "user";

/// One conversational turn in a session history.
///
/// `role` is either [`USER_ROLE`] or the name of the agent that produced
/// `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(USER_ROLE, content)
    }
}

/// Snapshot of session identity, goal, history and artifacts.
///
/// A context is never mutated after construction. [`with_artifact`] and
/// [`with_message`] return fresh instances that own their own copies of the
/// history and artifact containers, so a reference held by an earlier agent
/// keeps observing exactly what it was given.
///
/// [`with_artifact`]: ExecutionContext::with_artifact
/// [`with_message`]: ExecutionContext::with_message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionContext {
    session_id: String,
    goal: Option<String>,
    history: Vec<HistoryEntry>,
    artifacts: BTreeMap<String, Metadata>,
}

impl ExecutionContext {
    /// Context for a freshly created session: no history, no artifacts.
    pub fn new(session_id: impl Into<String>, goal: Option<String>) -> Self {
        Self {
            session_id: session_id.into(),
            goal,
            history: Vec::new(),
            artifacts: BTreeMap::new(),
        }
    }

    /// Rebuild a context from persisted session state.
    pub fn from_parts(
        session_id: impl Into<String>,
        goal: Option<String>,
        history: &[HistoryEntry],
        artifacts: &BTreeMap<String, Metadata>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            goal,
            history: history.to_vec(),
            artifacts: artifacts.clone(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn artifacts(&self) -> &BTreeMap<String, Metadata> {
        &self.artifacts
    }

    /// Metadata published by `name`, if that agent has run.
    pub fn artifact(&self, name: &str) -> Option<&Metadata> {
        self.artifacts.get(name)
    }

    /// Return a new context whose artifact for `name` is `value`.
    ///
    /// An existing artifact under the same name is replaced, never merged.
    pub fn with_artifact(&self, name: impl Into<String>, value: Metadata) -> Self {
        let mut artifacts = self.artifacts.clone();
        artifacts.insert(name.into(), value);
        Self {
            session_id: self.session_id.clone(),
            goal: self.goal.clone(),
            history: self.history.clone(),
            artifacts,
        }
    }

    /// Return a new context with one history entry appended.
    pub fn with_message(&self, role: impl Into<String>, content: impl Into<String>) -> Self {
        let mut history = self.history.clone();
        history.push(HistoryEntry::new(role, content));
        Self {
            session_id: self.session_id.clone(),
            goal: self.goal.clone(),
            history,
            artifacts: self.artifacts.clone(),
        }
    }

    /// Split into owned history and artifacts for persistence.
    pub fn into_parts(self) -> (Vec<HistoryEntry>, BTreeMap<String, Metadata>) {
        (self.history, self.artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: serde_json::Value) -> Metadata {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn with_artifact_leaves_receiver_untouched() {
        let base = ExecutionContext::new("s-1", Some("goal".to_string()));
        let next = base.with_artifact("planner", meta(json!({"steps": ["a"]})));

        assert!(base.artifacts().is_empty());
        assert_eq!(next.artifact("planner"), Some(&meta(json!({"steps": ["a"]}))));
        assert_eq!(next.session_id(), "s-1");
        assert_eq!(next.goal(), Some("goal"));
    }

    /// Later writes for the same agent name replace the earlier value wholesale.
    #[test]
    fn with_artifact_overwrites_instead_of_merging() {
        let ctx = ExecutionContext::new("s-1", None)
            .with_artifact("coder", meta(json!({"a": 1, "b": 2})))
            .with_artifact("coder", meta(json!({"c": 3})));

        assert_eq!(ctx.artifact("coder"), Some(&meta(json!({"c": 3}))));
        assert_eq!(ctx.artifacts().len(), 1);
    }

    #[test]
    fn with_message_appends_one_entry() {
        let base = ExecutionContext::new("s-1", None).with_message(USER_ROLE, "hello");
        let next = base.with_message("navigator", "indexed");

        assert_eq!(base.history().len(), 1);
        assert_eq!(
            next.history(),
            &[
                HistoryEntry::user("hello"),
                HistoryEntry::new("navigator", "indexed"),
            ]
        );
    }

    #[test]
    fn from_parts_copies_containers() {
        let mut history = vec![HistoryEntry::user("first")];
        let mut artifacts = BTreeMap::new();
        artifacts.insert("planner".to_string(), meta(json!({"steps": []})));

        let ctx = ExecutionContext::from_parts("s-2", None, &history, &artifacts);
        history.push(HistoryEntry::user("second"));
        artifacts.clear();

        assert_eq!(ctx.history().len(), 1);
        assert!(ctx.artifact("planner").is_some());
    }
}
