//! Stable exit codes for orchestrator CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid config, input or any other error.
pub const INVALID: i32 = 1;
/// The config names an agent that is not registered.
pub const MISCONFIGURED: i32 = 2;
