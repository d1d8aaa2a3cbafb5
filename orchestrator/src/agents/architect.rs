//! Architect agent: a structured component proposal for downstream agents.

use anyhow::Result;
use serde_json::{Value, json};

use crate::agents::{Agent, AgentBackend};
use crate::core::context::ExecutionContext;
use crate::core::types::{AgentResult, Metadata};

pub const NAME: &str = "architect";

const INSTRUCTIONS: &str = "\
You are the architect. Propose the high-level components (backend, frontend, \
infrastructure) needed for the goal, building on the analyzer's findings.";

#[derive(Debug, Clone)]
pub struct ArchitectAgent {
    backend: AgentBackend,
}

impl ArchitectAgent {
    pub fn new(backend: AgentBackend) -> Self {
        Self { backend }
    }

    pub fn fallback(&self, _context: &ExecutionContext) -> AgentResult {
        let sections = [
            (
                "backend",
                json!({
                    "framework": "axum",
                    "modules": ["orchestrator", "agents", "api"],
                }),
            ),
            (
                "frontend",
                json!({
                    "framework": "Next.js",
                    "features": ["chat", "plan viewer", "diff inspector"],
                }),
            ),
            (
                "infrastructure",
                json!({
                    "docker": true,
                    "ci": "GitHub Actions",
                }),
            ),
        ];
        let description = sections
            .iter()
            .map(|(name, details)| format!("{name}: {details}"))
            .collect::<Vec<_>>()
            .join("; ");
        let metadata: Metadata = sections
            .into_iter()
            .map(|(name, details)| (name.to_string(), details))
            .collect::<serde_json::Map<String, Value>>();
        AgentResult::new(format!("Architecture proposal -> {description}"), metadata)
    }
}

impl Agent for ArchitectAgent {
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
    fn fallback_describes_each_section() {
        let backend = AgentBackend::new(Arc::new(StubGenerator::default()), 4096);
        let agent = ArchitectAgent::new(backend);
        let result = agent.run(&ExecutionContext::new("s", None)).expect("run");

        assert!(result.content.starts_with("Architecture proposal -> backend: "));
        assert!(result.content.contains("; frontend: "));
        assert!(result.content.contains("; infrastructure: "));
        assert_eq!(
            result.metadata.get("infrastructure"),
            Some(&json!({"docker": true, "ci": "GitHub Actions"}))
        );
    }
}
