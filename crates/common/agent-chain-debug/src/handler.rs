//! The callback surface an orchestration runtime drives.
//!
//! Every hook has a default implementation that packs its arguments into a
//! [`CallbackEvent`] and forwards it to [`CallbackHandler::on_event`], so a
//! handler that treats all events alike only needs to implement that one
//! method. Handlers interested in a single hook override just that hook.

use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::events::{
    AgentAction, AgentFinish, CallbackEvent, ChainValues, EventKind, LLMResult, RunContext,
    Serialized,
};

pub trait CallbackHandler: Send + Sync + Debug {
    /// Catch-all for every hook that is not overridden.
    fn on_event(&self, event: &CallbackEvent, ctx: &RunContext) {
        let _ = (event, ctx);
    }

    fn on_llm_start(&self, serialized: &Serialized, prompts: &[String], ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::LlmStart {
                serialized: serialized.clone(),
                prompts: prompts.to_vec(),
            },
            ctx,
        );
    }

    fn on_llm_end(&self, response: &LLMResult, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::LlmEnd {
                response: response.clone(),
            },
            ctx,
        );
    }

    fn on_llm_error(&self, error: &dyn Display, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::LlmError {
                error: error.to_string(),
            },
            ctx,
        );
    }

    fn on_chain_start(&self, serialized: &Serialized, inputs: &ChainValues, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::ChainStart {
                serialized: serialized.clone(),
                inputs: inputs.clone(),
            },
            ctx,
        );
    }

    fn on_chain_end(&self, outputs: &ChainValues, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::ChainEnd {
                outputs: outputs.clone(),
            },
            ctx,
        );
    }

    fn on_chain_error(&self, error: &dyn Display, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::ChainError {
                error: error.to_string(),
            },
            ctx,
        );
    }

    fn on_tool_start(&self, serialized: &Serialized, input_str: &str, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::ToolStart {
                serialized: serialized.clone(),
                input_str: input_str.to_string(),
            },
            ctx,
        );
    }

    fn on_tool_end(&self, output: &str, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::ToolEnd {
                output: output.to_string(),
            },
            ctx,
        );
    }

    fn on_tool_error(&self, error: &dyn Display, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::ToolError {
                error: error.to_string(),
            },
            ctx,
        );
    }

    fn on_text(&self, text: &str, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::Text {
                text: text.to_string(),
            },
            ctx,
        );
    }

    fn on_agent_action(&self, action: &AgentAction, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::AgentAction {
                action: action.clone(),
            },
            ctx,
        );
    }

    fn on_agent_finish(&self, finish: &AgentFinish, ctx: &RunContext) {
        self.on_event(
            &CallbackEvent::AgentFinish {
                finish: finish.clone(),
            },
            ctx,
        );
    }

    /// Whether a panic inside this handler is re-raised by the manager.
    fn raise_error(&self) -> bool {
        false
    }

    fn ignore_llm(&self) -> bool {
        false
    }

    fn ignore_chain(&self) -> bool {
        false
    }

    fn ignore_tool(&self) -> bool {
        false
    }

    fn ignore_agent(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "CallbackHandler"
    }
}

pub type ArcCallbackHandler = Arc<dyn CallbackHandler>;

/// Whether `handler` has opted out of events of `kind`.
pub fn ignores(handler: &dyn CallbackHandler, kind: EventKind) -> bool {
    match kind {
        EventKind::Llm => handler.ignore_llm(),
        EventKind::Chain => handler.ignore_chain(),
        EventKind::Tool => handler.ignore_tool(),
        EventKind::Agent => handler.ignore_agent(),
        EventKind::Text => false,
    }
}

/// Deliver `event` to the hook of `handler` that matches its variant.
pub fn handle_event(handler: &dyn CallbackHandler, event: &CallbackEvent, ctx: &RunContext) {
    match event {
        CallbackEvent::LlmStart {
            serialized,
            prompts,
        } => handler.on_llm_start(serialized, prompts, ctx),
        CallbackEvent::LlmEnd { response } => handler.on_llm_end(response, ctx),
        CallbackEvent::LlmError { error } => handler.on_llm_error(error, ctx),
        CallbackEvent::ChainStart { serialized, inputs } => {
            handler.on_chain_start(serialized, inputs, ctx)
        }
        CallbackEvent::ChainEnd { outputs } => handler.on_chain_end(outputs, ctx),
        CallbackEvent::ChainError { error } => handler.on_chain_error(error, ctx),
        CallbackEvent::ToolStart {
            serialized,
            input_str,
        } => handler.on_tool_start(serialized, input_str, ctx),
        CallbackEvent::ToolEnd { output } => handler.on_tool_end(output, ctx),
        CallbackEvent::ToolError { error } => handler.on_tool_error(error, ctx),
        CallbackEvent::Text { text } => handler.on_text(text, ctx),
        CallbackEvent::AgentAction { action } => handler.on_agent_action(action, ctx),
        CallbackEvent::AgentFinish { finish } => handler.on_agent_finish(finish, ctx),
    }
}
