//! Prompt pack builder for agent text generation.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::core::context::ExecutionContext;

const AGENT_TEMPLATE: &str = include_str!("prompts/agent.md");

const TRUNCATED_MARKER: &str = "\n[truncated]";

/// Droppable sections, least critical first.
const DROP_ORDER: [&str; 2] = ["artifacts", "history"];

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--\s*section:(\w+)\s+(required|droppable)\s*-->")
        .unwrap_or_else(|err| panic!("section marker regex: {err}"))
});

#[derive(Debug, Clone, Serialize)]
struct HistoryView<'a> {
    role: &'a str,
    content: &'a str,
}

/// Artifact rendered as its compact JSON text.
#[derive(Debug, Clone, Serialize)]
struct ArtifactView<'a> {
    name: &'a str,
    value: String,
}

fn render_template(agent: &str, instructions: &str, ctx: &ExecutionContext) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("agent", AGENT_TEMPLATE)
        .context("load agent prompt template")?;

    let history: Vec<HistoryView<'_>> = ctx
        .history()
        .iter()
        .map(|entry| HistoryView {
            role: entry.role.as_str(),
            content: entry.content.trim(),
        })
        .collect();
    let artifacts = ctx
        .artifacts()
        .iter()
        .map(|(name, value)| {
            Ok(ArtifactView {
                name: name.as_str(),
                value: serde_json::to_string(value)
                    .with_context(|| format!("serialize artifact {name}"))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let template = env.get_template("agent")?;
    let rendered = template
        .render(context! {
            agent => agent,
            instructions => instructions.trim(),
            goal => ctx.goal().map(str::trim).filter(|s| !s.is_empty()),
            history => history,
            artifacts => artifacts,
        })
        .with_context(|| format!("render prompt for agent {agent}"))?;
    Ok(rendered)
}

/// A parsed section from rendered template output.
#[derive(Debug, Clone)]
struct ParsedSection {
    /// Section identifier (e.g., "contract", "goal").
    key: String,
    /// Whether this section is required (cannot be dropped).
    required: bool,
    /// Section content without its marker.
    content: String,
}

/// Parse sections from rendered template output using HTML comment markers.
///
/// Markers follow format: `<!-- section:KEY required|droppable -->`
fn parse_sections(rendered: &str) -> Vec<ParsedSection> {
    let markers: Vec<_> = SECTION_RE.captures_iter(rendered).collect();
    let mut sections = Vec::with_capacity(markers.len());

    for (i, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(key), Some(kind)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let required = kind.as_str() == "required";
        let end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(rendered.len(), |m| m.start());

        let content = rendered[whole.end()..end].trim().to_string();
        if !content.is_empty() || required {
            sections.push(ParsedSection {
                key: key.as_str().to_string(),
                required,
                content,
            });
        }
    }

    sections
}

fn total_len(sections: &[ParsedSection]) -> usize {
    sections.iter().map(|s| s.content.len()).sum()
}

/// Apply budget to parsed sections, dropping droppable sections as needed.
///
/// Drop order: artifacts -> history. Whatever still overflows is cut from
/// the last remaining section.
fn apply_budget_to_sections(sections: &mut Vec<ParsedSection>, budget: usize) {
    if total_len(sections) <= budget {
        return;
    }

    for key in DROP_ORDER {
        if total_len(sections) <= budget {
            break;
        }
        if let Some(idx) = sections.iter().position(|s| s.key == key && !s.required) {
            debug!(
                section = key,
                bytes_dropped = sections[idx].content.len(),
                "dropped section for budget"
            );
            sections.remove(idx);
        }
    }

    let total = total_len(sections);
    let Some(last) = sections.last_mut() else {
        return;
    };
    if total <= budget {
        return;
    }
    let other_len = total - last.content.len();
    let allowed = budget.saturating_sub(other_len);
    let before_len = last.content.len();
    if allowed > TRUNCATED_MARKER.len() {
        truncate_at_char_boundary(&mut last.content, allowed - TRUNCATED_MARKER.len());
        last.content.push_str(TRUNCATED_MARKER);
    } else {
        truncate_at_char_boundary(&mut last.content, allowed);
    }
    debug!(
        section = last.key,
        before_len,
        after_len = last.content.len(),
        "truncated section for budget"
    );
}

fn truncate_at_char_boundary(text: &mut String, max_len: usize) {
    if text.len() <= max_len {
        return;
    }
    let mut cut = max_len;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}

/// Render sections back to a single string.
fn render_sections(sections: &[ParsedSection]) -> String {
    sections
        .iter()
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds a prompt pack within a byte budget, dropping less critical sections first.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    budget_bytes: usize,
}

impl PromptBuilder {
    /// Create a builder with the given byte budget.
    pub fn new(budget_bytes: usize) -> Self {
        Self { budget_bytes }
    }

    /// Build the prompt for one agent invocation over `ctx`.
    pub fn build(
        &self,
        agent: &str,
        instructions: &str,
        ctx: &ExecutionContext,
    ) -> Result<PromptPack> {
        let rendered = render_template(agent, instructions, ctx)?;
        let mut sections = parse_sections(&rendered);
        apply_budget_to_sections(&mut sections, self.budget_bytes);

        Ok(PromptPack {
            content: render_sections(&sections),
        })
    }
}

/// A rendered prompt ready to send to a text generator.
#[derive(Debug, Clone)]
pub struct PromptPack {
    content: String,
}

impl PromptPack {
    /// Get the rendered prompt content.
    pub fn render(&self) -> String {
        self.content.clone()
    }
}
