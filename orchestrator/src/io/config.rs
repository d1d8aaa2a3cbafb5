//! Orchestrator configuration stored in `orchestrator.toml`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "orchestrator.toml";

/// Orchestrator configuration (TOML).
///
/// Missing fields default to the stock pipeline with text generation
/// disabled, so every agent answers with its deterministic fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Agent invoked once per session to derive the plan.
    pub planner: String,

    /// Agents run on every chat turn, in order. Must not include the planner.
    pub agent_order: Vec<String>,

    /// Prompt size budget handed to the generator; droppable sections go first.
    pub prompt_budget_bytes: usize,

    pub generator: GeneratorConfig,

    pub navigator: NavigatorConfig,
}

/// Which text-generation backend the built-in agents delegate to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorProvider {
    /// No backend; agents use their fallbacks.
    #[default]
    Stub,
    /// Spawn `command` with the prompt on stdin.
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub provider: GeneratorProvider,

    /// Program and arguments for the `command` provider (e.g. `["codex","exec","-"]`).
    pub command: Vec<String>,

    /// Working directory for the command. Defaults to the process directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,

    /// Per-invocation wall-clock budget in seconds.
    pub timeout_secs: u64,

    /// Truncate captured generator output beyond this many bytes.
    pub output_limit_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Directory whose top-level layout the navigator indexes.
    pub root: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: GeneratorProvider::Stub,
            command: vec!["codex".to_string(), "exec".to_string(), "-".to_string()],
            workdir: None,
            timeout_secs: 120,
            output_limit_bytes: 100_000,
        }
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            planner: "planner".to_string(),
            agent_order: [
                "navigator",
                "analyzer",
                "architect",
                "coder",
                "devops",
                "validator",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            prompt_budget_bytes: 20_000,
            generator: GeneratorConfig::default(),
            navigator: NavigatorConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.planner.trim().is_empty() {
            return Err(anyhow!("planner must be a non-empty agent name"));
        }
        let mut seen = HashSet::new();
        for name in &self.agent_order {
            if name.trim().is_empty() {
                return Err(anyhow!("agent_order must not contain blank names"));
            }
            if name == &self.planner {
                return Err(anyhow!(
                    "agent_order must not include the planner '{}'",
                    self.planner
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(anyhow!("agent_order lists '{name}' more than once"));
            }
        }
        if self.prompt_budget_bytes == 0 {
            return Err(anyhow!("prompt_budget_bytes must be > 0"));
        }
        self.generator.validate()
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(anyhow!("generator.timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("generator.output_limit_bytes must be > 0"));
        }
        if self.provider == GeneratorProvider::Command
            && (self.command.is_empty() || self.command[0].trim().is_empty())
        {
            return Err(anyhow!("generator.command must be a non-empty array"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `OrchestratorConfig::default()`.
pub fn load_config(path: &Path) -> Result<OrchestratorConfig> {
    if !path.exists() {
        let cfg = OrchestratorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: OrchestratorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &OrchestratorConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, OrchestratorConfig::default());
        assert_eq!(cfg.agent_order.first().map(String::as_str), Some("navigator"));
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("orchestrator.toml");
        let mut cfg = OrchestratorConfig::default();
        cfg.generator.provider = GeneratorProvider::Command;
        cfg.generator.workdir = Some(PathBuf::from("/tmp"));
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    /// Partial files fill the rest from defaults.
    #[test]
    fn partial_file_uses_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("orchestrator.toml");
        fs::write(
            &path,
            "agent_order = [\"coder\", \"validator\"]\n\n[generator]\ntimeout_secs = 5\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.agent_order, vec!["coder", "validator"]);
        assert_eq!(cfg.generator.timeout_secs, 5);
        assert_eq!(cfg.generator.provider, GeneratorProvider::Stub);
        assert_eq!(cfg.planner, "planner");
    }

    #[test]
    fn validate_rejects_planner_in_turn_order() {
        let mut cfg = OrchestratorConfig::default();
        cfg.agent_order.push("planner".to_string());
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("must not include the planner"));
    }

    #[test]
    fn validate_rejects_duplicates_and_blanks() {
        let mut cfg = OrchestratorConfig::default();
        cfg.agent_order.push("coder".to_string());
        assert!(cfg.validate().unwrap_err().to_string().contains("more than once"));

        cfg.agent_order = vec![" ".to_string()];
        assert!(cfg.validate().unwrap_err().to_string().contains("blank"));
    }

    #[test]
    fn validate_rejects_empty_command_for_command_provider() {
        let mut cfg = OrchestratorConfig::default();
        cfg.generator.provider = GeneratorProvider::Command;
        cfg.generator.command.clear();
        assert!(cfg.validate().unwrap_err().to_string().contains("generator.command"));

        cfg.generator.provider = GeneratorProvider::Stub;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_reports_invalid_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("orchestrator.toml");
        fs::write(&path, "prompt_budget_bytes = 0\n").expect("write");

        let err = load_config(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid config"));
        assert!(message.contains("prompt_budget_bytes"));
    }
}
