use agent_chain_debug::{
    AgentAction, AgentFinish, CallbackEvent, CallbackHandler, ChainValues, DebugCallbackHandler,
    GenerationPolicy, Generation, LLMResult, RunContext, Serialized, TraceEntry, handle_event,
};
use serde_json::json;

fn output_of(handler: &DebugCallbackHandler) -> String {
    let mut out = Vec::new();
    handler.write_buffer(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn sample_events() -> Vec<CallbackEvent> {
    vec![
        CallbackEvent::ChainStart {
            serialized: Serialized::new(),
            inputs: ChainValues::from([("question".to_string(), json!("2 + 2?"))]),
        },
        CallbackEvent::LlmStart {
            serialized: Serialized::new(),
            prompts: vec!["What is 2 + 2?".to_string()],
        },
        CallbackEvent::LlmEnd {
            response: LLMResult::from_text("Use the calculator"),
        },
        CallbackEvent::AgentAction {
            action: AgentAction::new("calculator", "2 + 2", "I need to add"),
        },
        CallbackEvent::ToolStart {
            serialized: Serialized::from([("name".to_string(), json!("calculator"))]),
            input_str: "2 + 2".to_string(),
        },
        CallbackEvent::ToolEnd {
            output: "4".to_string(),
        },
        CallbackEvent::AgentFinish {
            finish: AgentFinish::new(
                ChainValues::from([("output".to_string(), json!("4"))]),
                "Final Answer: 4",
            ),
        },
        CallbackEvent::ChainEnd {
            outputs: ChainValues::from([("output".to_string(), json!("4"))]),
        },
    ]
}

#[test]
fn test_llm_start_then_end() {
    let handler = DebugCallbackHandler::default();
    let ctx = RunContext::new("r1");
    handler.on_llm_start(&Serialized::new(), &["hello".to_string()], &ctx);
    handler.on_llm_end(&LLMResult::from_text("world"), &ctx);

    assert_eq!(
        handler.entries(),
        vec![
            TraceEntry::line("\n\n--- on_llm_start ---\n"),
            TraceEntry::line("hello"),
            TraceEntry::line("\n\n--- on_llm_end ---\n"),
            TraceEntry::line("world"),
        ]
    );
}

#[test]
fn test_chain_start_records_run_id_and_inputs() {
    let handler = DebugCallbackHandler::default();
    let inputs = ChainValues::from([("x".to_string(), json!(1))]);
    handler.on_chain_start(&Serialized::new(), &inputs, &RunContext::new("r1"));

    let entries: Vec<String> = handler.entries().iter().map(|e| e.to_string()).collect();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].contains("r1"));
    assert!(entries[0].contains("--- on_chain_start ---"));
    assert!(entries[1].contains("r1"));
    assert!(entries[1].contains(r#"{"x":1}"#));
}

#[test]
fn test_clear_then_print_emits_nothing() {
    let handler = DebugCallbackHandler::default();
    handler.on_text("something", &RunContext::new("r1"));
    handler.clear_buffer();
    assert!(handler.is_empty());
    assert_eq!(output_of(&handler), "");
}

#[test]
fn test_groups_follow_delivery_order() {
    let handler = DebugCallbackHandler::default();
    let ctx = RunContext::new("r1");
    let events = sample_events();
    for event in &events {
        handle_event(&handler, event, &ctx);
    }

    let entries = handler.entries();
    assert_eq!(entries.len(), events.len() * 2);
    for (group, event) in entries.chunks(2).zip(&events) {
        assert!(
            group[0].to_string().contains(event.name()),
            "header {:?} does not name {}",
            group[0],
            event.name()
        );
    }
}

#[test]
fn test_recording_after_clear_matches_fresh_handler() {
    let ctx = RunContext::new("r1");
    let reused = DebugCallbackHandler::default();
    for event in sample_events() {
        handle_event(&reused, &event, &ctx);
    }
    reused.clear_buffer();

    let fresh = DebugCallbackHandler::default();
    for handler in [&reused, &fresh] {
        handler.on_tool_error(&"division by zero", &ctx);
        handler.on_text("done", &ctx);
    }
    assert_eq!(reused.entries(), fresh.entries());
    assert_eq!(output_of(&reused), output_of(&fresh));
}

#[test]
fn test_print_emits_entries_untransformed() {
    let handler = DebugCallbackHandler::default();
    let ctx = RunContext::new("r1");
    for event in sample_events().iter().take(3) {
        handle_event(&handler, event, &ctx);
    }

    let expected: String = handler
        .entries()
        .iter()
        .map(|entry| format!("{}\n", entry))
        .collect();
    assert_eq!(output_of(&handler), expected);
}

#[test]
fn test_error_payloads_recorded_as_given() {
    let handler = DebugCallbackHandler::default();
    let ctx = RunContext::new("r7");
    let io_error = std::io::Error::other("connection reset");
    handler.on_llm_error(&io_error, &ctx);
    handler.on_chain_error(&"bad input", &ctx);

    assert_eq!(
        handler.entries(),
        vec![
            TraceEntry::line("\n\n--- on_llm_error ---\n"),
            TraceEntry::Error("connection reset".to_string()),
            TraceEntry::line("\n\nr7--- on_chain_error ---"),
            TraceEntry::line("r7:bad input"),
        ]
    );
}

#[test]
fn test_all_policy_records_every_generation() {
    let handler = DebugCallbackHandler::builder()
        .policy(GenerationPolicy::All)
        .build();
    let ctx = RunContext::new("r1");
    handler.on_llm_start(
        &Serialized::new(),
        &["first".to_string(), "second".to_string()],
        &ctx,
    );
    handler.on_llm_end(
        &LLMResult::new(vec![
            vec![Generation::new("a")],
            vec![Generation::new("b"), Generation::new("c")],
        ]),
        &ctx,
    );

    let texts: Vec<String> = handler.entries().iter().map(|e| e.to_string()).collect();
    assert_eq!(
        texts,
        vec![
            "\n\n--- on_llm_start ---\n",
            "first",
            "second",
            "\n\n--- on_llm_end ---\n",
            "a",
            "b",
            "c",
        ]
    );
}

#[test]
fn test_bounded_handler_keeps_newest_entries() {
    let handler = DebugCallbackHandler::builder()
        .capacity(std::num::NonZeroUsize::new(4).unwrap())
        .build();
    let ctx = RunContext::new("r1");
    for i in 0..5 {
        handler.on_text(&format!("note {i}"), &ctx);
    }

    assert_eq!(handler.len(), 4);
    assert_eq!(handler.dropped(), 6);
    let entries = handler.entries();
    assert_eq!(entries[1], TraceEntry::line("note 3"));
    assert_eq!(entries[3], TraceEntry::line("note 4"));
}
