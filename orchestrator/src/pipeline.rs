//! Ordered execution of one chat turn across the configured agents.

use std::sync::Arc;

use tracing::{debug, info_span};

use crate::agents::{Agent, AgentRegistry};
use crate::core::context::ExecutionContext;
use crate::core::types::AgentExecution;
use crate::error::OrchestratorError;

/// Final context and per-agent records of one pipeline turn.
///
/// `executions[i]` was produced by the `i`-th agent of the runner's order.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub context: ExecutionContext,
    pub executions: Vec<AgentExecution>,
}

/// Walks a fixed agent order, threading the context from one agent to the next.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    order: Vec<String>,
}

impl PipelineRunner {
    pub fn new(order: Vec<String>) -> Self {
        Self { order }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Run every agent in order over `context`.
    ///
    /// Each result is folded into the context as `artifacts[agent] = metadata`
    /// followed by a history entry with role `agent`, so later agents observe
    /// everything published before them. All names are resolved before the
    /// first agent runs: an unregistered name fails the turn without invoking
    /// anything.
    pub fn run(
        &self,
        registry: &AgentRegistry,
        context: ExecutionContext,
    ) -> Result<PipelineOutcome, OrchestratorError> {
        let agents = self.resolve(registry)?;

        let mut context = context;
        let mut executions = Vec::with_capacity(agents.len());
        for (index, agent) in agents.iter().enumerate() {
            let name = agent.name();
            let _span = info_span!("agent", agent = name, index).entered();

            let result = agent
                .run(&context)
                .map_err(|err| OrchestratorError::agent_failed(name, err))?;
            debug!(
                content_len = result.content.len(),
                metadata_keys = result.metadata.len(),
                "agent finished"
            );

            context = context
                .with_artifact(name, result.metadata.clone())
                .with_message(name, result.content.as_str());
            executions.push(AgentExecution::from_result(name, result));
        }

        Ok(PipelineOutcome {
            context,
            executions,
        })
    }

    fn resolve(&self, registry: &AgentRegistry) -> Result<Vec<Arc<dyn Agent>>, OrchestratorError> {
        self.order.iter().map(|name| registry.require(name)).collect()
    }
}
