//! Planner agent: turns a high-level goal into an ordered list of steps.

use anyhow::Result;
use serde_json::json;

use crate::agents::{Agent, AgentBackend, bullet_list};
use crate::core::context::ExecutionContext;
use crate::core::plan::{STEPS_KEY, parse_bullet_lines};
use crate::core::types::{AgentResult, Metadata};

pub const NAME: &str = "planner";

const DEFAULT_GOAL: &str = "Refine project requirements";

const INSTRUCTIONS: &str = "\
You are the planner. Break the goal into a short, ordered list of concrete \
steps. Answer with one step per line, each line starting with \"- \". Do not \
add headings or commentary.";

/// Planner agent; runs once per session, at plan creation.
#[derive(Debug, Clone)]
pub struct PlannerAgent {
    backend: AgentBackend,
}

impl PlannerAgent {
    pub fn new(backend: AgentBackend) -> Self {
        Self { backend }
    }

    pub fn fallback(&self, context: &ExecutionContext) -> AgentResult {
        let goal = context
            .goal()
            .filter(|goal| !goal.is_empty())
            .unwrap_or(DEFAULT_GOAL);
        let steps = vec![
            format!("Understand the request: {goal}"),
            "Inspect repository state and identify relevant assets".to_string(),
            "Draft implementation tasks for each component (backend, frontend, infra)".to_string(),
            "Define validation strategy and acceptance criteria".to_string(),
        ];
        let content = format!("Proposed plan:\n{}", bullet_list(&steps));
        AgentResult::new(content, steps_metadata(steps))
    }
}

impl Agent for PlannerAgent {
    fn name(&self) -> &str {
        NAME
    }

    fn run(&self, context: &ExecutionContext) -> Result<AgentResult> {
        let Some(content) = self.backend.generate(NAME, INSTRUCTIONS, context) else {
            return Ok(self.fallback(context));
        };
        // Empty metadata lets plan derivation fall back to the generated text.
        let steps = parse_bullet_lines(&content);
        let metadata = if steps.is_empty() {
            Metadata::new()
        } else {
            steps_metadata(steps)
        };
        Ok(AgentResult::new(content, metadata))
    }
}

fn steps_metadata(steps: Vec<String>) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(STEPS_KEY.to_string(), json!(steps));
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::plan::derive_plan;
    use crate::io::generator::StubGenerator;
    use crate::test_support::ScriptedGenerator;
    use std::sync::Arc;

    fn stub_backend() -> AgentBackend {
        AgentBackend::new(Arc::new(StubGenerator::default()), 4096)
    }

    #[test]
    fn fallback_plan_mentions_goal_first() {
        let agent = PlannerAgent::new(stub_backend());
        let ctx = ExecutionContext::new("s", Some("Implement orchestrator".to_string()));

        let result = agent.run(&ctx).expect("run");
        let plan = derive_plan(&result);

        assert_eq!(plan.len(), 4);
        assert!(plan[0].contains("Implement orchestrator"));
        assert!(result.content.starts_with("Proposed plan:\n- Understand the request"));
    }

    #[test]
    fn empty_goal_uses_default_wording() {
        let agent = PlannerAgent::new(stub_backend());
        let result = agent
            .run(&ExecutionContext::new("s", Some(String::new())))
            .expect("run");
        assert!(derive_plan(&result)[0].contains(DEFAULT_GOAL));

        let result = agent.run(&ExecutionContext::new("s", None)).expect("run");
        assert!(derive_plan(&result)[0].contains(DEFAULT_GOAL));
    }

    #[test]
    fn whitespace_goal_is_kept_verbatim() {
        let agent = PlannerAgent::new(stub_backend());
        let result = agent
            .run(&ExecutionContext::new("s", Some(" Ship MVP ".to_string())))
            .expect("run");
        assert_eq!(derive_plan(&result)[0], "Understand the request:  Ship MVP ");
    }

    #[test]
    fn generated_bullets_become_steps() {
        let generator = ScriptedGenerator::new(vec![Ok("Plan:\n- one\n- two".to_string())]);
        let agent = PlannerAgent::new(AgentBackend::new(Arc::new(generator), 4096));

        let result = agent
            .run(&ExecutionContext::new("s", Some("goal".to_string())))
            .expect("run");

        assert_eq!(result.metadata.get(STEPS_KEY), Some(&json!(["one", "two"])));
        assert_eq!(derive_plan(&result), vec!["one", "two"]);
    }

    #[test]
    fn generated_prose_leaves_metadata_empty() {
        let generator = ScriptedGenerator::new(vec![Ok("Just do it.".to_string())]);
        let agent = PlannerAgent::new(AgentBackend::new(Arc::new(generator), 4096));

        let result = agent
            .run(&ExecutionContext::new("s", Some("goal".to_string())))
            .expect("run");

        assert!(result.metadata.is_empty());
        assert!(derive_plan(&result).is_empty());
    }
}
