//! Validator agent: verification routines that guard quality.

use anyhow::Result;
use serde_json::json;

use crate::agents::{Agent, AgentBackend, bullet_list, string_list};
use crate::core::context::ExecutionContext;
use crate::core::types::{AgentResult, Metadata};

pub const NAME: &str = "validator";

const INSTRUCTIONS: &str = "\
You are the validator. Describe how the work produced so far should be \
verified before it ships, one check per line starting with \"- \".";

const VALIDATION_STEPS: &[&str] = &[
    "Run the test suite for backend modules",
    "Execute frontend lint and type checks",
    "Perform security scanning before deployment",
];

#[derive(Debug, Clone)]
pub struct ValidatorAgent {
    backend: AgentBackend,
}

impl ValidatorAgent {
    pub fn new(backend: AgentBackend) -> Self {
        Self { backend }
    }

    pub fn fallback(&self, _context: &ExecutionContext) -> AgentResult {
        let steps = string_list(VALIDATION_STEPS);
        let content = format!("Validation steps:\n{}", bullet_list(&steps));
        let mut metadata = Metadata::new();
        metadata.insert("validation_steps".to_string(), json!(steps));
        AgentResult::new(content, metadata)
    }
}

impl Agent for ValidatorAgent {
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
