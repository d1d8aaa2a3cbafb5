//! I/O helpers: configuration files, subprocesses, prompts and generators.

pub mod config;
pub mod generator;
pub mod process;
pub mod prompt;
