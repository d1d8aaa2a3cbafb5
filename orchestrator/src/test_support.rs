//! Test-only agents, generators and fixtures.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use serde_json::json;

use crate::agents::Agent;
use crate::core::context::ExecutionContext;
use crate::core::plan::STEPS_KEY;
use crate::core::types::{AgentResult, Metadata};
use crate::io::config::OrchestratorConfig;
use crate::io::generator::TextGenerator;

/// Generator that replays queued responses and records every prompt.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_string());
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("scripted generator exhausted")))
    }
}

/// Configured generator that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGenerator;

impl TextGenerator for FailingGenerator {
    fn generate(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("provider unavailable"))
    }
}

/// Agent returning a fixed result (or error) and recording its inputs.
#[derive(Debug)]
pub struct StaticAgent {
    name: String,
    outcome: std::result::Result<AgentResult, String>,
    seen: Mutex<Vec<ExecutionContext>>,
}

impl StaticAgent {
    pub fn new(name: &str, result: AgentResult) -> Self {
        Self {
            name: name.to_string(),
            outcome: Ok(result),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Agent whose every run raises `message`.
    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Contexts passed to `run`, in call order.
    pub fn seen(&self) -> Vec<ExecutionContext> {
        self.seen.lock().expect("seen lock").clone()
    }
}

impl Agent for StaticAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, context: &ExecutionContext) -> Result<AgentResult> {
        self.seen.lock().expect("seen lock").push(context.clone());
        self.outcome.clone().map_err(|message| anyhow!(message))
    }
}

/// Metadata carrying a structured `steps` list.
pub fn steps_metadata(steps: &[&str]) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(STEPS_KEY.to_string(), json!(steps));
    metadata
}

/// Stock configuration with the stub generator and navigator rooted at `root`.
pub fn stub_config(root: &Path) -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default();
    config.navigator.root = root.to_path_buf();
    config
}

/// Write `contents` as `orchestrator.toml` under `dir`, returning its path.
pub fn write_config_file(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("orchestrator.toml");
    std::fs::write(&path, contents).expect("write config");
    path
}
