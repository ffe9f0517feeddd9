use std::sync::Arc;

use colloquy_common::{ConversationId, Role, ToolCallResult, Turn};
use colloquy_store::{ConversationStore, SqliteStore};

use super::*;
use crate::testing::{code_call, RecordingExecutor, ScriptedChannel};
use crate::{AiError, ModelReply, TokenUsage};

fn handle() -> SessionHandle {
    SessionHandle::new().with_system_prompt("You are terse.")
}

fn with_usage(reply: ModelReply, input: u64, output: u64) -> ModelReply {
    ModelReply {
        usage: TokenUsage {
            input_tokens: input,
            output_tokens: output,
        },
        ..reply
    }
}

#[tokio::test]
async fn plain_answer_ends_the_loop() {
    let channel = ScriptedChannel::new(vec![Ok(ModelReply::text("Use a HashMap."))]);
    let executor = RecordingExecutor::default();
    let mut handle = handle();

    let outcome = handle
        .chat(&channel, &executor, Turn::user("How do I count words?"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        LoopOutcome::Final {
            text: "Use a HashMap.".into(),
            usage: TokenUsage::default(),
            rounds: 0,
        }
    );
    assert_eq!(
        handle.turns(),
        &[Turn::user("How do I count words?"), Turn::model("Use a HashMap.")]
    );
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn tool_calls_run_in_order_and_return_as_one_batch() {
    let channel = ScriptedChannel::new(vec![
        Ok(ModelReply::tool_calls(vec![code_call("a = 1"), code_call("b = 2")])),
        Ok(ModelReply::text("done")),
    ]);
    let executor = RecordingExecutor::default();
    let mut handle = handle();

    let outcome = handle
        .chat(&channel, &executor, Turn::user("run both"))
        .await
        .unwrap();

    assert!(matches!(outcome, LoopOutcome::Final { rounds: 1, .. }));
    assert_eq!(executor.calls(), vec!["a = 1", "b = 2"]);

    let turns = handle.turns();
    assert_eq!(turns.len(), 4);
    assert_eq!(
        turns[1],
        Turn::tool_calls(vec![code_call("a = 1"), code_call("b = 2")])
    );
    assert_eq!(
        turns[2],
        Turn::tool_results(vec![
            ToolCallResult {
                name: "execute_code".into(),
                output: "Output:\nrun #1: a = 1\n".into(),
            },
            ToolCallResult {
                name: "execute_code".into(),
                output: "Output:\nrun #2: b = 2\n".into(),
            },
        ])
    );
    assert_eq!(turns[3], Turn::model("done"));

    // The follow-up request carried the calls and their results.
    let requests = channel.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].len(), 1);
    assert_eq!(requests[1], turns[..3].to_vec());
}

#[tokio::test]
async fn loop_keeps_going_until_text_arrives() {
    let channel = ScriptedChannel::new(vec![
        Ok(ModelReply::tool_calls(vec![code_call("print(1)")])),
        Ok(ModelReply::tool_calls(vec![code_call("print(2)")])),
        Ok(ModelReply::tool_calls(vec![code_call("print(3)")])),
        Ok(ModelReply::text("1, 2, 3")),
    ]);
    let executor = RecordingExecutor::default();
    let mut handle = handle();

    let outcome = handle
        .chat(&channel, &executor, Turn::user("count"))
        .await
        .unwrap();

    match outcome {
        LoopOutcome::Final { text, rounds, .. } => {
            assert_eq!(text, "1, 2, 3");
            assert_eq!(rounds, 3);
        }
        other => panic!("expected final answer, got {other:?}"),
    }
    assert_eq!(executor.calls().len(), 3);
    assert_eq!(handle.turn_count(), 1 + 3 * 2 + 1);
}

#[tokio::test]
async fn text_next_to_tool_calls_is_not_an_answer() {
    let mut first = ModelReply::tool_calls(vec![code_call("x")]);
    first.content = "Let me check.".into();
    let channel = ScriptedChannel::new(vec![Ok(first), Ok(ModelReply::text("checked"))]);
    let executor = RecordingExecutor::default();
    let mut handle = handle();

    let outcome = handle
        .chat(&channel, &executor, Turn::user("check"))
        .await
        .unwrap();

    assert!(matches!(outcome, LoopOutcome::Final { ref text, .. } if text == "checked"));
    let model_texts: Vec<_> = handle
        .turns()
        .iter()
        .filter(|t| t.role == Role::Model)
        .filter_map(|t| t.as_text())
        .collect();
    assert_eq!(model_texts, vec!["checked"]);
}

#[tokio::test]
async fn round_limit_stops_the_loop_and_rolls_back() {
    let channel = ScriptedChannel::repeating(|| ModelReply::tool_calls(vec![code_call("again")]));
    let executor = RecordingExecutor::default();
    let seeded = vec![Turn::user("earlier"), Turn::model("reply")];
    let mut handle = handle().with_max_tool_rounds(2).with_turns(seeded.clone());

    let outcome = handle
        .chat(&channel, &executor, Turn::user("loop forever"))
        .await
        .unwrap();

    assert!(matches!(outcome, LoopOutcome::ToolLoopExceeded { rounds: 2, .. }));
    assert_eq!(executor.calls().len(), 2);
    assert_eq!(channel.requests().len(), 3);
    assert_eq!(handle.turns(), seeded.as_slice());
}

#[tokio::test]
async fn zero_round_limit_never_executes_tools() {
    let channel = ScriptedChannel::repeating(|| ModelReply::tool_calls(vec![code_call("x")]));
    let executor = RecordingExecutor::default();
    let mut handle = handle().with_max_tool_rounds(0);

    let outcome = handle
        .chat(&channel, &executor, Turn::user("hi"))
        .await
        .unwrap();

    assert!(matches!(outcome, LoopOutcome::ToolLoopExceeded { rounds: 0, .. }));
    assert!(executor.calls().is_empty());
    assert_eq!(handle.turn_count(), 0);
}

#[tokio::test]
async fn channel_failure_leaves_no_partial_turns() {
    let channel = ScriptedChannel::new(vec![
        Ok(ModelReply::tool_calls(vec![code_call("print('hi')")])),
        Err(AiError::NetworkError("connection reset".into())),
    ]);
    let executor = RecordingExecutor::default();
    let seeded = vec![Turn::user("earlier"), Turn::model("reply")];
    let mut handle = handle().with_turns(seeded.clone());

    let err = handle
        .chat(&channel, &executor, Turn::user("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, AiError::NetworkError(_)));
    assert_eq!(handle.turns(), seeded.as_slice());
}

#[tokio::test]
async fn empty_reply_is_an_error_and_rolls_back() {
    let channel = ScriptedChannel::new(vec![Ok(ModelReply::text(""))]);
    let executor = RecordingExecutor::default();
    let seeded = vec![Turn::user("earlier"), Turn::model("reply")];
    let mut handle = handle().with_turns(seeded.clone());

    let err = handle
        .chat(&channel, &executor, Turn::user("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, AiError::ParseError(_)));
    assert_eq!(handle.turns(), seeded.as_slice());
}

#[tokio::test]
async fn usage_is_summed_across_hops() {
    let channel = ScriptedChannel::new(vec![
        Ok(with_usage(
            ModelReply::tool_calls(vec![code_call("1 + 1")]),
            100,
            10,
        )),
        Ok(with_usage(ModelReply::text("2"), 130, 4)),
    ]);
    let executor = RecordingExecutor::default();
    let mut handle = handle();

    let outcome = handle
        .chat(&channel, &executor, Turn::user("1 + 1?"))
        .await
        .unwrap();

    let LoopOutcome::Final { usage, .. } = outcome else {
        panic!("expected final answer");
    };
    assert_eq!(usage.input_tokens, 230);
    assert_eq!(usage.output_tokens, 14);
}

#[tokio::test]
async fn persona_is_sent_on_every_hop() {
    let channel = ScriptedChannel::new(vec![
        Ok(ModelReply::tool_calls(vec![code_call("x")])),
        Ok(ModelReply::text("ok")),
    ]);
    let executor = RecordingExecutor::default();
    let mut handle = handle();

    handle
        .chat(&channel, &executor, Turn::user("go"))
        .await
        .unwrap();

    assert_eq!(
        channel.system_prompts(),
        vec![
            Some("You are terse.".to_string()),
            Some("You are terse.".to_string())
        ]
    );
}

// -- manager ------------------------------------------------------------------

fn manager() -> (Arc<SqliteStore>, SessionManager) {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let manager = SessionManager::new(store.clone())
        .with_system_prompt("persona")
        .with_max_tool_rounds(4);
    (store, manager)
}

#[test]
fn start_new_is_empty_and_untitled() {
    let (_, manager) = manager();
    let (first, title, handle) = manager.start_new();
    let (second, _, _) = manager.start_new();

    assert_ne!(first, second);
    assert_eq!(title, PLACEHOLDER_TITLE);
    assert_eq!(handle.turn_count(), 0);
    assert_eq!(handle.system_prompt(), Some("persona"));
    assert_eq!(handle.max_tool_rounds(), 4);
    assert_eq!(handle.tools().len(), 1);
}

#[test]
fn resume_seeds_handle_with_stored_text_turns() {
    let (store, manager) = manager();
    let id = ConversationId::new();
    let history = vec![
        Turn::user("What is a lifetime?"),
        Turn::model("A region of code where a reference is valid."),
    ];
    store.save(&id, "What is a lifetime?", &history).unwrap();

    let handle = manager.resume(&id, "What is a lifetime?").unwrap();
    assert_eq!(handle.turns(), history.as_slice());
    assert_eq!(handle.system_prompt(), Some("persona"));
}

#[test]
fn resume_unknown_id_starts_empty() {
    let (_, manager) = manager();
    let handle = manager
        .resume(&ConversationId::from("missing"), PLACEHOLDER_TITLE)
        .unwrap();
    assert_eq!(handle.turn_count(), 0);
}
