//! Typed payloads for the lifecycle events a debug handler observes.
//!
//! Every callback receives a [`RunContext`] alongside its payload. The
//! context carries the correlation identifier that ties the start, end and
//! error events of one unit of work together.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Serialized description of the component that emitted an event.
pub type Serialized = HashMap<String, Value>;

/// Input or output mapping of a chain.
///
/// Ordered so that the rendered form is stable.
pub type ChainValues = BTreeMap<String, Value>;

/// Opaque correlation identifier of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Mint a fresh, random run id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<Uuid> for RunId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

/// Context passed uniformly to every callback.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunContext {
    pub run_id: RunId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_run_id: Option<RunId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl RunContext {
    pub fn new(run_id: impl Into<RunId>) -> Self {
        Self {
            run_id: run_id.into(),
            parent_run_id: None,
            tags: Vec::new(),
        }
    }

    /// Context for a run nested under `parent`, inheriting its tags.
    pub fn child_of(parent: &RunContext) -> Self {
        Self {
            run_id: RunId::new(),
            parent_run_id: Some(parent.run_id.clone()),
            tags: parent.tags.clone(),
        }
    }

    pub fn with_parent(mut self, parent_run_id: impl Into<RunId>) -> Self {
        self.parent_run_id = Some(parent_run_id.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A single text generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_info: Option<HashMap<String, Value>>,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            generation_info: None,
        }
    }
}

/// Result of a model call: one list of candidate generations per prompt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LLMResult {
    pub generations: Vec<Vec<Generation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_output: Option<HashMap<String, Value>>,
}

impl LLMResult {
    pub fn new(generations: Vec<Vec<Generation>>) -> Self {
        Self {
            generations,
            llm_output: None,
        }
    }

    /// Result holding a single generation for a single prompt.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![vec![Generation::new(text)]])
    }

    /// Text of the first generation for the first prompt, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.generations
            .first()
            .and_then(|candidates| candidates.first())
            .map(|generation| generation.text.as_str())
    }
}

/// Tool input that can be either a string or a dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolInput {
    Text(String),
    Dict(ChainValues),
}

impl fmt::Display for ToolInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolInput::Text(text) => write!(f, "'{}'", text),
            ToolInput::Dict(dict) => f.write_str(&render_values(dict)),
        }
    }
}

impl From<&str> for ToolInput {
    fn from(s: &str) -> Self {
        ToolInput::Text(s.to_string())
    }
}

impl From<String> for ToolInput {
    fn from(s: String) -> Self {
        ToolInput::Text(s)
    }
}

impl From<ChainValues> for ToolInput {
    fn from(d: ChainValues) -> Self {
        ToolInput::Dict(d)
    }
}

/// An agent's decision to run a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    /// The name of the tool to execute.
    pub tool: String,
    pub tool_input: ToolInput,
    /// Free-form reasoning the agent produced before choosing the action.
    pub log: String,
}

impl AgentAction {
    pub fn new(
        tool: impl Into<String>,
        tool_input: impl Into<ToolInput>,
        log: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            tool_input: tool_input.into(),
            log: log.into(),
        }
    }
}

impl fmt::Display for AgentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tool='{}' tool_input={} log='{}'",
            self.tool, self.tool_input, self.log
        )
    }
}

/// An agent's final return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFinish {
    pub return_values: ChainValues,
    pub log: String,
}

impl AgentFinish {
    pub fn new(return_values: ChainValues, log: impl Into<String>) -> Self {
        Self {
            return_values,
            log: log.into(),
        }
    }
}

impl fmt::Display for AgentFinish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "return_values={} log='{}'",
            render_values(&self.return_values),
            self.log
        )
    }
}

/// One lifecycle event, carrying only the fields that event needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CallbackEvent {
    LlmStart {
        serialized: Serialized,
        prompts: Vec<String>,
    },
    LlmEnd {
        response: LLMResult,
    },
    LlmError {
        error: String,
    },
    ChainStart {
        serialized: Serialized,
        inputs: ChainValues,
    },
    ChainEnd {
        outputs: ChainValues,
    },
    ChainError {
        error: String,
    },
    ToolStart {
        serialized: Serialized,
        input_str: String,
    },
    ToolEnd {
        output: String,
    },
    ToolError {
        error: String,
    },
    Text {
        text: String,
    },
    AgentAction {
        action: AgentAction,
    },
    AgentFinish {
        finish: AgentFinish,
    },
}

impl CallbackEvent {
    /// Name of the hook this event is delivered to.
    pub fn name(&self) -> &'static str {
        match self {
            CallbackEvent::LlmStart { .. } => "on_llm_start",
            CallbackEvent::LlmEnd { .. } => "on_llm_end",
            CallbackEvent::LlmError { .. } => "on_llm_error",
            CallbackEvent::ChainStart { .. } => "on_chain_start",
            CallbackEvent::ChainEnd { .. } => "on_chain_end",
            CallbackEvent::ChainError { .. } => "on_chain_error",
            CallbackEvent::ToolStart { .. } => "on_tool_start",
            CallbackEvent::ToolEnd { .. } => "on_tool_end",
            CallbackEvent::ToolError { .. } => "on_tool_error",
            CallbackEvent::Text { .. } => "on_text",
            CallbackEvent::AgentAction { .. } => "on_agent_action",
            CallbackEvent::AgentFinish { .. } => "on_agent_finish",
        }
    }

    /// Broad category of the event, used by handlers to opt out of groups.
    pub fn kind(&self) -> EventKind {
        match self {
            CallbackEvent::LlmStart { .. }
            | CallbackEvent::LlmEnd { .. }
            | CallbackEvent::LlmError { .. } => EventKind::Llm,
            CallbackEvent::ChainStart { .. }
            | CallbackEvent::ChainEnd { .. }
            | CallbackEvent::ChainError { .. } => EventKind::Chain,
            CallbackEvent::ToolStart { .. }
            | CallbackEvent::ToolEnd { .. }
            | CallbackEvent::ToolError { .. } => EventKind::Tool,
            CallbackEvent::Text { .. } => EventKind::Text,
            CallbackEvent::AgentAction { .. } | CallbackEvent::AgentFinish { .. } => {
                EventKind::Agent
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Llm,
    Chain,
    Tool,
    Text,
    Agent,
}

/// Name of a component from its serialized description.
///
/// Prefers `"name"`, then the last element of `"id"`.
pub fn serialized_name(serialized: &Serialized) -> Option<&str> {
    serialized.get("name").and_then(|v| v.as_str()).or_else(|| {
        serialized.get("id").and_then(|v| {
            v.as_array()
                .and_then(|arr| arr.last())
                .and_then(|v| v.as_str())
        })
    })
}

/// Compact JSON rendering of a mapping.
pub fn render_values(values: &ChainValues) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| format!("{:?}", values))
}
