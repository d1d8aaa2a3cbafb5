//! Name → agent lookup, resolved once when the service is built.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::agents::analyzer::AnalyzerAgent;
use crate::agents::architect::ArchitectAgent;
use crate::agents::coder::CoderAgent;
use crate::agents::devops::DevOpsAgent;
use crate::agents::navigator::NavigatorAgent;
use crate::agents::planner::PlannerAgent;
use crate::agents::validator::ValidatorAgent;
use crate::agents::{Agent, AgentBackend};
use crate::error::OrchestratorError;

/// Registry of available agents.
#[derive(Default, Clone)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.names())
            .finish()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the seven built-in agents.
    pub fn builtin(backend: &AgentBackend, navigator_root: &Path) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PlannerAgent::new(backend.clone())));
        registry.register(Arc::new(NavigatorAgent::new(
            backend.clone(),
            navigator_root.to_path_buf(),
        )));
        registry.register(Arc::new(AnalyzerAgent::new(backend.clone())));
        registry.register(Arc::new(ArchitectAgent::new(backend.clone())));
        registry.register(Arc::new(CoderAgent::new(backend.clone())));
        registry.register(Arc::new(DevOpsAgent::new(backend.clone())));
        registry.register(Arc::new(ValidatorAgent::new(backend.clone())));
        registry
    }

    /// Register an agent under its own name, replacing any previous entry.
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.name().to_string(), agent);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).map(Arc::clone)
    }

    /// Like [`get`](Self::get), failing with `UnknownAgent`.
    pub fn require(&self, name: &str) -> Result<Arc<dyn Agent>, OrchestratorError> {
        self.get(name)
            .ok_or_else(|| OrchestratorError::UnknownAgent(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// All agent names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
