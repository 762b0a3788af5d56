//! Rendering of lifecycle events into trace entries.
//!
//! Each event renders into one group: a header line followed by the payload.
//! Hooks that belong to a correlated run (chain and tool) tag both the header
//! and the payload with the run id.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::{
    AgentAction, AgentFinish, CallbackEvent, LLMResult, RunContext, render_values,
    serialized_name,
};

/// How many prompts and generations of a model call get recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationPolicy {
    /// Only the first prompt, and the first generation of the first prompt.
    #[default]
    First,
    /// Every prompt and every generation, one entry each.
    All,
}

impl std::str::FromStr for GenerationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(GenerationPolicy::First),
            "all" => Ok(GenerationPolicy::All),
            other => Err(format!("unknown generation policy '{}'", other)),
        }
    }
}

/// One recorded trace entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEntry {
    /// A formatted line of text.
    Line(String),
    /// An error value, kept verbatim.
    Error(String),
    /// An agent action, kept verbatim.
    Action(AgentAction),
    /// An agent finish, kept verbatim.
    Finish(AgentFinish),
}

impl TraceEntry {
    pub fn line(text: impl Into<String>) -> Self {
        TraceEntry::Line(text.into())
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEntry::Line(text) | TraceEntry::Error(text) => f.write_str(text),
            TraceEntry::Action(action) => fmt::Display::fmt(action, f),
            TraceEntry::Finish(finish) => fmt::Display::fmt(finish, f),
        }
    }
}

fn header(hook: &str) -> TraceEntry {
    TraceEntry::Line(format!("\n\n--- {} ---\n", hook))
}

fn run_header(ctx: &RunContext, hook: &str) -> TraceEntry {
    TraceEntry::Line(format!("\n\n{}--- {} ---", ctx.run_id, hook))
}

fn run_payload(ctx: &RunContext, payload: impl fmt::Display) -> TraceEntry {
    TraceEntry::Line(format!("{}:{}", ctx.run_id, payload))
}

fn prompt_entries(prompts: &[String], policy: GenerationPolicy) -> Vec<TraceEntry> {
    match policy {
        GenerationPolicy::First => prompts.iter().take(1).map(TraceEntry::line).collect(),
        GenerationPolicy::All => prompts.iter().map(TraceEntry::line).collect(),
    }
}

fn generation_entries(response: &LLMResult, policy: GenerationPolicy) -> Vec<TraceEntry> {
    match policy {
        GenerationPolicy::First => response
            .first_text()
            .map(TraceEntry::line)
            .into_iter()
            .collect(),
        GenerationPolicy::All => response
            .generations
            .iter()
            .flatten()
            .map(|generation| TraceEntry::line(&generation.text))
            .collect(),
    }
}

/// Render one event into its group of entries.
pub fn render_event(
    event: &CallbackEvent,
    ctx: &RunContext,
    policy: GenerationPolicy,
) -> Vec<TraceEntry> {
    let hook = event.name();
    let mut group = Vec::with_capacity(2);
    match event {
        CallbackEvent::LlmStart { prompts, .. } => {
            group.push(header(hook));
            group.extend(prompt_entries(prompts, policy));
        }
        CallbackEvent::LlmEnd { response } => {
            group.push(header(hook));
            group.extend(generation_entries(response, policy));
        }
        CallbackEvent::LlmError { error } => {
            group.push(header(hook));
            group.push(TraceEntry::Error(error.clone()));
        }
        CallbackEvent::ChainStart { inputs, .. } => {
            group.push(run_header(ctx, hook));
            group.push(run_payload(ctx, render_values(inputs)));
        }
        CallbackEvent::ChainEnd { outputs } => {
            group.push(run_header(ctx, hook));
            group.push(run_payload(ctx, render_values(outputs)));
        }
        CallbackEvent::ChainError { error } | CallbackEvent::ToolError { error } => {
            group.push(run_header(ctx, hook));
            group.push(run_payload(ctx, error));
        }
        CallbackEvent::ToolStart {
            serialized,
            input_str,
        } => {
            let name = serialized_name(serialized).unwrap_or("<unknown>");
            group.push(run_header(ctx, &format!("{} {}", hook, name)));
            group.push(run_payload(ctx, input_str));
        }
        CallbackEvent::ToolEnd { output } => {
            group.push(run_header(ctx, hook));
            group.push(run_payload(ctx, output));
        }
        CallbackEvent::Text { text } => {
            group.push(header(hook));
            group.push(TraceEntry::line(text));
        }
        CallbackEvent::AgentAction { action } => {
            group.push(header(hook));
            group.push(TraceEntry::Action(action.clone()));
        }
        CallbackEvent::AgentFinish { finish } => {
            group.push(header(hook));
            group.push(TraceEntry::Finish(finish.clone()));
        }
    }
    group
}
