//! Plan derivation from planner output.

use serde_json::Value;

use crate::core::types::{AgentResult, Metadata};

/// Metadata key holding a structured list of plan steps.
pub const STEPS_KEY: &str = "steps";

/// Derive an ordered plan from an agent result.
///
/// A populated `steps` list of strings in `metadata` is returned verbatim and
/// `content` is ignored. Otherwise the plan is parsed from `content` with
/// [`parse_bullet_lines`]. Zero usable steps yields an empty plan.
pub fn derive_plan(result: &AgentResult) -> Vec<String> {
    if let Some(steps) = structured_steps(&result.metadata) {
        return steps;
    }
    parse_bullet_lines(&result.content)
}

/// Extract a non-empty `steps` list of strings from metadata.
///
/// Returns `None` when the key is missing, empty, or not an array of strings.
pub fn structured_steps(metadata: &Metadata) -> Option<Vec<String>> {
    let Value::Array(items) = metadata.get(STEPS_KEY)? else {
        return None;
    };
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Keep only hyphen-bulleted lines, stripped of the marker, in order.
///
/// Lines whose first non-whitespace character is not `-` are dropped, even
/// when they sit between bullets. The leading run of `-` and spaces is removed
/// and the rest trimmed; lines that end up empty are dropped.
pub fn parse_bullet_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-'))
        .map(|line| line.trim_start_matches(['-', ' ']).trim())
        .filter(|step| !step.is_empty())
        .map(str::to_string)
        .collect()
}
