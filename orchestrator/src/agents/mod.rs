//! Agent capability, registry and the built-in agent set.
//!
//! Every agent exposes a stable name and a single `run` operation. Built-in
//! agents may delegate to a [`TextGenerator`]; when the generator is not
//! configured or fails they return a deterministic fallback, so `run` only
//! errors for truly exceptional conditions.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::core::context::ExecutionContext;
use crate::core::types::AgentResult;
use crate::io::generator::TextGenerator;
use crate::io::prompt::PromptBuilder;

pub mod analyzer;
pub mod architect;
pub mod coder;
pub mod devops;
pub mod navigator;
pub mod planner;
pub mod registry;
pub mod validator;

pub use registry::AgentRegistry;

/// One pluggable pipeline unit.
pub trait Agent: Send + Sync {
    /// Stable name, unique across a registry. Also the artifact key.
    fn name(&self) -> &str;

    /// Produce a result from the given context.
    fn run(&self, context: &ExecutionContext) -> Result<AgentResult>;
}

/// Generator and prompt settings shared by the built-in agents.
#[derive(Clone)]
pub struct AgentBackend {
    generator: Arc<dyn TextGenerator>,
    prompt_budget_bytes: usize,
}

impl fmt::Debug for AgentBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentBackend")
            .field("configured", &self.generator.is_configured())
            .field("prompt_budget_bytes", &self.prompt_budget_bytes)
            .finish()
    }
}

impl AgentBackend {
    pub fn new(generator: Arc<dyn TextGenerator>, prompt_budget_bytes: usize) -> Self {
        Self {
            generator,
            prompt_budget_bytes,
        }
    }

    /// Generated text for `agent`, or `None` when the fallback must be used.
    pub fn generate(
        &self,
        agent: &str,
        instructions: &str,
        context: &ExecutionContext,
    ) -> Option<String> {
        if !self.generator.is_configured() {
            debug!(agent, "generator not configured, using fallback");
            return None;
        }
        match self.try_generate(agent, instructions, context) {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(agent, error = %format!("{err:#}"), "generation failed, using fallback");
                None
            }
        }
    }

    /// Generated content with the fallback's metadata, or the fallback itself.
    pub fn run_with_fallback(
        &self,
        agent: &str,
        instructions: &str,
        context: &ExecutionContext,
        fallback: AgentResult,
    ) -> AgentResult {
        match self.generate(agent, instructions, context) {
            Some(content) => AgentResult::new(content, fallback.metadata),
            None => fallback,
        }
    }

    fn try_generate(
        &self,
        agent: &str,
        instructions: &str,
        context: &ExecutionContext,
    ) -> Result<String> {
        let prompt = PromptBuilder::new(self.prompt_budget_bytes)
            .build(agent, instructions, context)?
            .render();
        self.generator.generate(&prompt)
    }
}

/// Render `items` as hyphen bullets, one per line.
pub(crate) fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn string_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}
