//! Command-line front end for the agent orchestrator.
//!
//! Every command prints machine-readable JSON on stdout; diagnostics go to
//! stderr (see `RUST_LOG`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use orchestrator::error::OrchestratorError;
use orchestrator::exit_codes;
use orchestrator::io::config::{DEFAULT_CONFIG_PATH, OrchestratorConfig, load_config, write_config};
use orchestrator::logging;
use orchestrator::service::OrchestratorService;

#[derive(Parser, Debug)]
#[command(
    name = "orchestrator",
    version,
    about = "Run a goal through an ordered pipeline of cooperating agents"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Load the config and check every configured agent is registered.
    Validate,
    /// Create a session for GOAL and print its plan.
    Plan {
        goal: String,
    },
    /// Create a session for GOAL, then run each message as a chat turn.
    Run {
        goal: String,
        /// Chat message; repeat for several turns.
        #[arg(short, long = "message")]
        messages: Vec<String>,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Validate => cmd_validate(&cli.config),
        Command::Plan { goal } => cmd_plan(&cli.config, &goal),
        Command::Run { goal, messages } => cmd_run(&cli.config, &goal, &messages),
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<OrchestratorError>() {
        Some(OrchestratorError::UnknownAgent(_)) => exit_codes::MISCONFIGURED,
        _ => exit_codes::INVALID,
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &OrchestratorConfig::default())?;
    print_json(&json!({ "config": path.display().to_string() }))
}

fn cmd_validate(path: &Path) -> Result<()> {
    let service = build_service(path)?;
    service.verify_agents()?;
    print_json(&json!({
        "planner": service.planner(),
        "agent_order": service.agent_order(),
        "registered": service.registry().names(),
    }))
}

fn cmd_plan(path: &Path, goal: &str) -> Result<()> {
    let service = build_service(path)?;
    let session = service.create_plan(goal)?;
    print_json(&session)
}

fn cmd_run(path: &Path, goal: &str, messages: &[String]) -> Result<()> {
    let service = build_service(path)?;
    let session = service.create_plan(goal)?;
    let mut runs = Vec::with_capacity(messages.len());
    for message in messages {
        let run = service
            .handle_message(&session.session_id, message)
            .with_context(|| format!("chat turn {:?}", message))?;
        runs.push(run);
    }
    print_json(&json!({ "plan": session, "runs": runs }))
}

fn build_service(path: &Path) -> Result<OrchestratorService> {
    let config = load_config(path)?;
    OrchestratorService::from_config(&config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{payload}");
    Ok(())
}
