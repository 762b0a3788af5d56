//! Callback handler that streams the trace to a writer instead of buffering.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::events::{CallbackEvent, RunContext};
use crate::handler::CallbackHandler;
use crate::trace::{GenerationPolicy, render_event};

pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Writes each event's trace group straight to a sink, one entry per line.
///
/// Nothing is retained in memory, which makes this the handler of choice for
/// long-running pipelines.
#[derive(Clone)]
pub struct WriterCallbackHandler {
    writer: SharedWriter,
    policy: GenerationPolicy,
}

impl std::fmt::Debug for WriterCallbackHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterCallbackHandler")
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for WriterCallbackHandler {
    fn default() -> Self {
        Self::stdout()
    }
}

impl WriterCallbackHandler {
    pub fn stdout() -> Self {
        Self::with_writer(Arc::new(Mutex::new(Box::new(io::stdout()))))
    }

    pub fn stderr() -> Self {
        Self::with_writer(Arc::new(Mutex::new(Box::new(io::stderr()))))
    }

    pub fn with_writer(writer: SharedWriter) -> Self {
        Self {
            writer,
            policy: GenerationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: GenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn write_event(&self, event: &CallbackEvent, ctx: &RunContext) -> io::Result<()> {
        let group = render_event(event, ctx, self.policy);
        let mut writer = self.writer.lock();
        for entry in &group {
            writeln!(writer, "{}", entry)?;
        }
        writer.flush()
    }
}

impl CallbackHandler for WriterCallbackHandler {
    fn on_event(&self, event: &CallbackEvent, ctx: &RunContext) {
        if let Err(err) = self.write_event(event, ctx) {
            tracing::warn!(
                hook = event.name(),
                run_id = %ctx.run_id,
                error = %err,
                "failed to write debug trace"
            );
        }
    }

    fn name(&self) -> &str {
        "WriterCallbackHandler"
    }
}
