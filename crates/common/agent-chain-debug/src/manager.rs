//! Fan-out of lifecycle events to a set of handlers.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::events::{CallbackEvent, RunContext};
use crate::handler::{ArcCallbackHandler, CallbackHandler, handle_event, ignores};

/// Dispatches every event to its registered handlers in registration order.
///
/// A handler that panics is logged and skipped; the remaining handlers still
/// receive the event. Handlers whose `raise_error` is set have their panic
/// resumed after logging.
#[derive(Debug, Clone, Default)]
pub struct CallbackManager {
    handlers: Vec<ArcCallbackHandler>,
    tags: Vec<String>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handlers(handlers: Vec<ArcCallbackHandler>) -> Self {
        Self {
            handlers,
            tags: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: ArcCallbackHandler) {
        if !self
            .handlers
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &handler))
        {
            self.handlers.push(handler);
        }
    }

    pub fn remove_handler(&mut self, handler: &ArcCallbackHandler) {
        self.handlers
            .retain(|existing| !Arc::ptr_eq(existing, handler));
    }

    pub fn handlers(&self) -> &[ArcCallbackHandler] {
        &self.handlers
    }

    pub fn add_tags(&mut self, tags: impl IntoIterator<Item = impl Into<String>>) {
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }

    /// Context for a new top-level run carrying the manager's tags.
    pub fn root_context(&self) -> RunContext {
        RunContext::default().with_tags(self.tags.iter().cloned())
    }

    /// Context for a run nested under `parent`.
    pub fn child_context(&self, parent: &RunContext) -> RunContext {
        let mut ctx = RunContext::child_of(parent);
        for tag in &self.tags {
            if !ctx.tags.contains(tag) {
                ctx.tags.push(tag.clone());
            }
        }
        ctx
    }

    pub fn dispatch(&self, event: &CallbackEvent, ctx: &RunContext) {
        let kind = event.kind();
        for handler in &self.handlers {
            if ignores(handler.as_ref(), kind) {
                continue;
            }
            let result = catch_unwind(AssertUnwindSafe(|| {
                handle_event(handler.as_ref(), event, ctx);
            }));
            if let Err(panic_payload) = result {
                let error_msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown error".to_string()
                };
                tracing::warn!(
                    target: "agent_chain_debug::callbacks",
                    "Error in {}.{} callback: {}",
                    handler.name(),
                    event.name(),
                    error_msg,
                );
                if handler.raise_error() {
                    std::panic::resume_unwind(panic_payload);
                }
            }
        }
    }
}

impl CallbackHandler for CallbackManager {
    fn on_event(&self, event: &CallbackEvent, ctx: &RunContext) {
        self.dispatch(event, ctx);
    }

    fn name(&self) -> &str {
        "CallbackManager"
    }
}
