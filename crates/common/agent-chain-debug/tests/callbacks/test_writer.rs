use std::io::Write;
use std::sync::Arc;

use agent_chain_debug::{
    CallbackHandler, DebugCallbackHandler, LLMResult, RunContext, Serialized,
    WriterCallbackHandler,
};
use parking_lot::Mutex;

/// A Write implementation backed by a shared buffer for test output capture.
#[derive(Clone, Default)]
struct TestWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl TestWriter {
    fn output(&self) -> String {
        String::from_utf8(self.buffer.lock().clone()).unwrap()
    }
}

impl Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_streamed_output_matches_buffered_print() {
    let writer = TestWriter::default();
    let boxed: Box<dyn Write + Send> = Box::new(writer.clone());
    let streaming = WriterCallbackHandler::with_writer(Arc::new(Mutex::new(boxed)));
    let buffered = DebugCallbackHandler::default();

    let ctx = RunContext::new("r1");
    for handler in [&streaming as &dyn CallbackHandler, &buffered] {
        handler.on_llm_start(&Serialized::new(), &["hello".to_string()], &ctx);
        handler.on_llm_end(&LLMResult::from_text("world"), &ctx);
        handler.on_tool_end("done", &ctx);
    }

    let mut printed = Vec::new();
    buffered.write_buffer(&mut printed).unwrap();
    assert_eq!(writer.output(), String::from_utf8(printed).unwrap());
}
