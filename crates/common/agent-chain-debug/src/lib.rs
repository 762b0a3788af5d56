//! Debug callback handlers for agent-chain pipelines.
//!
//! [`DebugCallbackHandler`] listens to the lifecycle hooks of a pipeline
//! (model calls, chains, tools, agent steps and free text) and keeps a
//! human-readable trace that can be printed or cleared on demand.
//! [`WriterCallbackHandler`] renders the same trace straight to a writer.

pub mod buffer;
pub mod config;
pub mod debug;
pub mod error;
pub mod events;
pub mod handler;
pub mod manager;
pub mod trace;
pub mod writer;

pub use buffer::TraceBuffer;
pub use config::DebugConfig;
pub use debug::DebugCallbackHandler;
pub use error::{Error, Result};
pub use events::{
    AgentAction, AgentFinish, CallbackEvent, ChainValues, EventKind, Generation, LLMResult,
    RunContext, RunId, Serialized, ToolInput,
};
pub use handler::{ArcCallbackHandler, CallbackHandler, handle_event};
pub use manager::CallbackManager;
pub use trace::{GenerationPolicy, TraceEntry, render_event};
pub use writer::{SharedWriter, WriterCallbackHandler};
