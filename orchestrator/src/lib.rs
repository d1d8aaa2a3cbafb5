//! Agent orchestration engine.
//!
//! A session starts with a goal; a designated planner agent turns it into an
//! ordered plan. Each chat message then runs a fixed, configured sequence of
//! agents, threading an immutable [`core::context::ExecutionContext`] from one
//! agent to the next so later agents can read what earlier ones published.
//!
//! - **[`core`]**: Pure, deterministic logic (context, plan derivation, value
//!   types). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config files, subprocesses, prompt
//!   rendering, text generation).
//! - **[`agents`]**: The agent capability, its registry and the built-in set.
//!
//! [`service::OrchestratorService`] ties these together behind `create_plan`,
//! `handle_message` and `get_plan`.

pub mod agents;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod service;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
