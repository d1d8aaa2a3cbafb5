//! Analyzer agent: interprets the goal and conversation so far.

use anyhow::Result;
use serde_json::json;

use crate::agents::{Agent, AgentBackend};
use crate::core::context::ExecutionContext;
use crate::core::types::{AgentResult, Metadata};

pub const NAME: &str = "analyzer";

const INSTRUCTIONS: &str = "\
You are the analyzer. Summarise the gap between the current state and the \
goal, and name the areas downstream agents should focus on.";

const SUMMARY: &str = "Analyzer Agent evaluated the request and suggests focusing on backend, \
frontend, and infrastructure scaffolding to unblock subsequent work.";

#[derive(Debug, Clone)]
pub struct AnalyzerAgent {
    backend: AgentBackend,
}

impl AnalyzerAgent {
    pub fn new(backend: AgentBackend) -> Self {
        Self { backend }
    }

    pub fn fallback(&self, context: &ExecutionContext) -> AgentResult {
        let mut metadata = Metadata::new();
        metadata.insert("goal".to_string(), json!(context.goal()));
        metadata.insert("history_count".to_string(), json!(context.history().len()));
        AgentResult::new(SUMMARY, metadata)
    }
}

impl Agent for AnalyzerAgent {
    fn name(&self) -> &str {
        NAME
    }

    fn run(&self, context: &ExecutionContext) -> Result<AgentResult> {
        let fallback = self.fallback(context);
        Ok(self
            .backend
            .run_with_fallback(NAME, INSTRUCTIONS, context, fallback))
    }
}
