//! Text-generation capability consumed by the built-in agents.
//!
//! The [`TextGenerator`] trait decouples agents from the actual generation
//! backend. [`StubGenerator`] is used when nothing is configured and makes
//! every agent take its deterministic fallback; [`CommandGenerator`] pipes the
//! rendered prompt into an external command and reads the answer from stdout.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::config::{GeneratorConfig, GeneratorProvider};
use crate::io::process::run_command_with_timeout;

const STUB_RESPONSE: &str =
    "Text generation is not configured. Falling back to static agent messages.";

/// Abstraction over text-generation backends.
pub trait TextGenerator: Send + Sync {
    /// Whether this generator is backed by a real provider.
    ///
    /// Agents skip unconfigured generators and use their fallback directly.
    fn is_configured(&self) -> bool {
        true
    }

    /// Generate text for a fully rendered prompt.
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Deterministic generator used when no provider is configured.
#[derive(Debug, Clone, Default)]
pub struct StubGenerator {
    response: Option<String>,
}

impl StubGenerator {
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }
}

impl TextGenerator for StubGenerator {
    fn is_configured(&self) -> bool {
        false
    }

    fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| STUB_RESPONSE.to_string()))
    }
}

/// Generator that spawns an external command with the prompt on stdin.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    workdir: Option<PathBuf>,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl CommandGenerator {
    pub fn new(command: &[String], timeout: Duration, output_limit_bytes: usize) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| anyhow!("generator command must not be empty"))?;
        if program.trim().is_empty() {
            return Err(anyhow!("generator command must not be empty"));
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            workdir: None,
            timeout,
            output_limit_bytes,
        })
    }

    /// Run the command from `workdir` instead of the process working directory.
    pub fn with_workdir(mut self, workdir: PathBuf) -> Self {
        self.workdir = Some(workdir);
        self
    }
}

impl TextGenerator for CommandGenerator {
    #[instrument(skip_all, fields(program = %self.program, timeout_secs = self.timeout.as_secs()))]
    fn generate(&self, prompt: &str) -> Result<String> {
        info!(prompt_bytes = prompt.len(), "starting generator command");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(workdir) = &self.workdir {
            cmd.current_dir(workdir);
        }

        let output = run_command_with_timeout(
            cmd,
            Some(prompt.as_bytes()),
            self.timeout,
            self.output_limit_bytes,
        )
        .with_context(|| format!("run generator {}", self.program))?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "generator timed out");
            return Err(anyhow!("generator timed out after {:?}", self.timeout));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "generator failed");
            return Err(anyhow!(
                "generator failed with status {:?}: {}{}",
                output.status.code(),
                output.stderr_text(),
                output.stderr_truncated_notice("generator")
            ));
        }

        let text = output.stdout_text().trim().to_string();
        if text.is_empty() {
            return Err(anyhow!("generator produced no output"));
        }
        if output.stdout_truncated > 0 {
            warn!(
                truncated = output.stdout_truncated,
                "generator output truncated"
            );
        }
        debug!(output_bytes = text.len(), "generator completed");
        Ok(text)
    }
}

/// Build the generator selected by configuration.
pub fn generator_from_config(config: &GeneratorConfig) -> Result<Arc<dyn TextGenerator>> {
    match config.provider {
        GeneratorProvider::Stub => Ok(Arc::new(StubGenerator::default())),
        GeneratorProvider::Command => {
            let mut generator = CommandGenerator::new(
                &config.command,
                Duration::from_secs(config.timeout_secs),
                config.output_limit_bytes,
            )?;
            if let Some(workdir) = &config.workdir {
                generator = generator.with_workdir(workdir.clone());
            }
            Ok(Arc::new(generator))
        }
    }
}
