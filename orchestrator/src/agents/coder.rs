//! Coder agent: translates the plan into concrete coding tasks.

use anyhow::Result;
use serde_json::{Value, json};

use crate::agents::{Agent, AgentBackend, bullet_list, planner, string_list};
use crate::core::context::ExecutionContext;
use crate::core::plan::STEPS_KEY;
use crate::core::types::{AgentResult, Metadata};

pub const NAME: &str = "coder";

const INSTRUCTIONS: &str = "\
You are the coder. Turn the planner's steps and the architect's proposal into \
concrete coding tasks, one per line starting with \"- \".";

const CODING_TASKS: &[&str] = &[
    "Implement orchestrator HTTP endpoints",
    "Create shared agent abstractions and stubs",
    "Develop chat UI components",
    "Author automated tests for orchestrator logic",
];

#[derive(Debug, Clone)]
pub struct CoderAgent {
    backend: AgentBackend,
}

impl CoderAgent {
    pub fn new(backend: AgentBackend) -> Self {
        Self { backend }
    }

    pub fn fallback(&self, context: &ExecutionContext) -> AgentResult {
        let plan_steps = context
            .artifact(planner::NAME)
            .and_then(|meta| meta.get(STEPS_KEY))
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let coding_tasks = string_list(CODING_TASKS);
        let content = format!("Coding tasks:\n{}", bullet_list(&coding_tasks));
        let mut metadata = Metadata::new();
        metadata.insert("plan_steps".to_string(), plan_steps);
        metadata.insert("coding_tasks".to_string(), json!(coding_tasks));
        AgentResult::new(content, metadata)
    }
}

impl Agent for CoderAgent {
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
