//! Navigator agent: a lightweight map of the workspace's top-level layout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;
use tracing::warn;

use crate::agents::{Agent, AgentBackend};
use crate::core::context::ExecutionContext;
use crate::core::types::{AgentResult, Metadata};

pub const NAME: &str = "navigator";

const INSTRUCTIONS: &str = "\
You are the navigator. Describe which parts of the repository are relevant \
to the goal and the latest user message, based on the directory index in the \
artifacts.";

#[derive(Debug, Clone)]
pub struct NavigatorAgent {
    backend: AgentBackend,
    root: PathBuf,
}

impl NavigatorAgent {
    pub fn new(backend: AgentBackend, root: PathBuf) -> Self {
        Self { backend, root }
    }

    pub fn fallback(&self, _context: &ExecutionContext) -> AgentResult {
        let directories = match list_directories(&self.root) {
            Ok(dirs) => dirs,
            Err(err) => {
                warn!(
                    root = %self.root.display(),
                    error = %format!("{err:#}"),
                    "directory index unavailable"
                );
                Vec::new()
            }
        };
        let content = format!("Indexed top-level directories: {}", directories.join(", "));
        let mut metadata = Metadata::new();
        metadata.insert("directories".to_string(), json!(directories));
        metadata.insert(
            "root".to_string(),
            json!(self.root.display().to_string()),
        );
        AgentResult::new(content, metadata)
    }
}

impl Agent for NavigatorAgent {
    fn name(&self) -> &str {
        NAME
    }

    fn run(&self, context: &ExecutionContext) -> Result<AgentResult> {
        let fallback = self.fallback(context);
        // The index is handed to the generator as an artifact of this agent.
        let context = context.with_artifact(NAME, fallback.metadata.clone());
        Ok(self
            .backend
            .run_with_fallback(NAME, INSTRUCTIONS, &context, fallback))
    }
}

/// Non-hidden directories directly under `root`, sorted by name.
fn list_directories(root: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(root).with_context(|| format!("read dir {}", root.display()))?;
    let mut directories = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if entry.path().is_dir() {
            directories.push(name);
        }
    }
    directories.sort();
    Ok(directories)
}
