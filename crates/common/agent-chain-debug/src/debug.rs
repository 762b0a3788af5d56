//! Callback handler that records a human-readable trace in memory.
//!
//! Every lifecycle event appends one group of [`TraceEntry`] values to a
//! [`TraceBuffer`]: a header naming the hook, then the payload. The trace can
//! be printed or cleared at any time.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::sync::Arc;

use bon::bon;
use parking_lot::Mutex;

use crate::buffer::TraceBuffer;
use crate::config::DebugConfig;
use crate::error::Result;
use crate::events::{CallbackEvent, RunContext};
use crate::handler::CallbackHandler;
use crate::trace::{GenerationPolicy, TraceEntry, render_event};

/// Records every lifecycle event into an in-memory trace.
///
/// Clones share the same buffer, so one clone can be handed to a callback
/// manager while another is kept for inspection.
///
/// # Example
///
/// ```ignore
/// use agent_chain_debug::{CallbackHandler, DebugCallbackHandler, LLMResult, RunContext};
///
/// let handler = DebugCallbackHandler::default();
/// let ctx = RunContext::new("r1");
/// handler.on_llm_start(&Default::default(), &["hello".to_string()], &ctx);
/// handler.on_llm_end(&LLMResult::from_text("world"), &ctx);
/// handler.print_buffer();
/// ```
#[derive(Debug, Clone)]
pub struct DebugCallbackHandler {
    buffer: Arc<Mutex<TraceBuffer>>,
    policy: GenerationPolicy,
    log_entries: bool,
}

/// Unbounded recorder that keeps the first prompt and generation only.
impl Default for DebugCallbackHandler {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[bon]
impl DebugCallbackHandler {
    #[builder]
    pub fn new(
        capacity: Option<NonZeroUsize>,
        #[builder(default)] policy: GenerationPolicy,
        #[builder(default)] log_entries: bool,
    ) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(TraceBuffer::with_capacity(capacity))),
            policy,
            log_entries,
        }
    }

    pub fn from_config(config: &DebugConfig) -> Self {
        tracing::debug!(
            capacity = ?config.capacity(),
            policy = ?config.generation_policy,
            "building debug callback handler"
        );
        Self::builder()
            .maybe_capacity(config.capacity())
            .policy(config.generation_policy)
            .log_entries(config.log_entries)
            .build()
    }

    pub fn policy(&self) -> GenerationPolicy {
        self.policy
    }

    /// Snapshot of the recorded entries, oldest first.
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.buffer.lock().to_vec()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Entries evicted by the capacity bound since the last clear. Whole
    /// groups are evicted, so this is always a sum of group sizes.
    pub fn dropped(&self) -> usize {
        self.buffer.lock().dropped()
    }

    /// Print the buffer to stdout, one entry per line.
    pub fn print_buffer(&self) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if let Err(err) = self.write_buffer(&mut lock) {
            tracing::warn!(error = %err, "failed to print debug trace");
        }
    }

    /// Write the buffer to `writer`, one entry per line.
    ///
    /// Works from a snapshot, so events keep recording while a slow sink drains.
    pub fn write_buffer<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let entries = self.entries();
        for entry in &entries {
            writeln!(writer, "{}", entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Clear the buffer.
    pub fn clear_buffer(&self) {
        self.buffer.lock().clear();
    }

    fn record(&self, event: &CallbackEvent, ctx: &RunContext) {
        let group = render_event(event, ctx, self.policy);
        tracing::trace!(hook = event.name(), run_id = %ctx.run_id, entries = group.len(), "recording");
        if self.log_entries {
            for entry in &group {
                tracing::debug!(hook = event.name(), "{}", entry);
            }
        }

        let mut buffer = self.buffer.lock();
        let first_eviction = buffer.dropped() == 0;
        let evicted = buffer.push_group(group);
        if evicted > 0 && first_eviction {
            tracing::warn!(
                capacity = ?buffer.capacity(),
                "debug trace buffer is full, evicting oldest groups"
            );
        }
    }
}

impl CallbackHandler for DebugCallbackHandler {
    fn on_event(&self, event: &CallbackEvent, ctx: &RunContext) {
        self.record(event, ctx);
    }

    fn name(&self) -> &str {
        "DebugCallbackHandler"
    }
}
