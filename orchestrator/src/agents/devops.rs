//! DevOps agent: CI/CD and runtime automation needs.

use anyhow::Result;
use serde_json::json;

use crate::agents::{Agent, AgentBackend};
use crate::core::context::ExecutionContext;
use crate::core::types::{AgentResult, Metadata};

pub const NAME: &str = "devops";

const INSTRUCTIONS: &str = "\
You are the DevOps engineer. List the build, CI and infrastructure work the \
coding tasks require, one item per line starting with \"- \".";

const DELIVERABLES: &[(&str, &str)] = &[
    ("docker", "Create a container image exposing the orchestrator API"),
    ("ci", "Configure a GitHub Actions workflow running tests and lint"),
    (
        "infrastructure",
        "Prepare Terraform placeholder for future cloud resources",
    ),
];

#[derive(Debug, Clone)]
pub struct DevOpsAgent {
    backend: AgentBackend,
}

impl DevOpsAgent {
    pub fn new(backend: AgentBackend) -> Self {
        Self { backend }
    }

    pub fn fallback(&self, _context: &ExecutionContext) -> AgentResult {
        let description = DELIVERABLES
            .iter()
            .map(|(key, value)| format!("- {key}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");
        let metadata: Metadata = DELIVERABLES
            .iter()
            .map(|(key, value)| ((*key).to_string(), json!(value)))
            .collect();
        AgentResult::new(format!("DevOps tasks:\n{description}"), metadata)
    }
}

impl Agent for DevOpsAgent {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::generator::StubGenerator;
    use std::sync::Arc;

    #[test]
    fn fallback_lists_deliverables_in_order() {
        let agent = DevOpsAgent::new(AgentBackend::new(Arc::new(StubGenerator::default()), 4096));
        let result = agent.run(&ExecutionContext::new("s", None)).expect("run");

        let lines: Vec<&str> = result.content.lines().collect();
        assert_eq!(lines[0], "DevOps tasks:");
        assert!(lines[1].starts_with("- docker: "));
        assert!(lines[2].starts_with("- ci: "));
        assert!(lines[3].starts_with("- infrastructure: "));
        assert_eq!(result.metadata.len(), 3);
    }
}
