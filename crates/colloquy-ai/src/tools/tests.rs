use std::time::Duration;

use colloquy_common::ToolCallRequest;

use super::*;
use crate::testing::{code_call, RecordingExecutor};

fn sh() -> ExecutionSandbox {
    ExecutionSandbox::new("sh", Vec::new()).unwrap()
}

// -- dispatch -----------------------------------------------------------------

#[tokio::test]
async fn dispatch_runs_execute_code() {
    let executor = RecordingExecutor::default();
    let result = dispatch(&executor, &code_call("print(42)")).await;

    assert_eq!(result.name, "execute_code");
    assert_eq!(result.output, "Output:\nrun #1: print(42)\n");
    assert_eq!(executor.calls(), vec!["print(42)".to_string()]);
}

#[tokio::test]
async fn dispatch_answers_unknown_tool_as_text() {
    let executor = RecordingExecutor::default();
    let call = ToolCallRequest::new("delete_files", serde_json::Map::new());
    let result = dispatch(&executor, &call).await;

    assert_eq!(result.name, "delete_files");
    assert_eq!(
        result.output,
        "Unknown tool: delete_files. Available tools: execute_code"
    );
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn dispatch_reports_missing_code_argument() {
    let executor = RecordingExecutor::default();
    let mut args = serde_json::Map::new();
    args.insert("code".into(), serde_json::json!(17));
    let result = dispatch(&executor, &ToolCallRequest::new("execute_code", args)).await;

    assert!(result.output.contains("requires a string argument `code`"));
    assert!(executor.calls().is_empty());
}

#[test]
fn builtin_tools_declares_only_execute_code() {
    let tools = builtin_tools();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, EXECUTE_CODE);
    assert_eq!(tools[0].parameters["properties"]["code"]["type"], "string");
    assert!(tools[0].description.contains("print"));
}

// -- outcome text -------------------------------------------------------------

#[test]
fn outcome_text_formats() {
    let out = ExecutionOutcome::Output {
        stdout: "4\n".into(),
        truncated: false,
    };
    assert_eq!(out.into_result_text(), "Output:\n4\n");

    assert_eq!(
        ExecutionOutcome::NoOutput.into_result_text(),
        sandbox::NO_OUTPUT_ADVICE
    );

    let failed = ExecutionOutcome::Failed {
        detail: "ZeroDivisionError: division by zero".into(),
    };
    assert_eq!(
        failed.into_result_text(),
        "Error while executing code:\nZeroDivisionError: division by zero"
    );

    let timed_out = ExecutionOutcome::TimedOut {
        limit: Duration::from_secs(10),
    };
    assert_eq!(
        timed_out.into_result_text(),
        "Execution stopped: exceeded the 10s time limit"
    );
}

// -- sandbox ------------------------------------------------------------------

#[test]
fn blocked_interpreter_rejected() {
    for bin in ["curl", "/usr/bin/wget", "sudo", "rm"] {
        let err = ExecutionSandbox::new(bin, Vec::new()).unwrap_err();
        assert!(err.contains("Interpreter not allowed"), "should reject {bin}");
    }
}

#[test]
fn allowed_interpreter_passes() {
    for bin in ["python3", "/usr/bin/python3", "node", "sh"] {
        assert!(
            ExecutionSandbox::new(bin, Vec::new()).is_ok(),
            "interpreter should be allowed: {bin}"
        );
    }
}

#[tokio::test]
async fn captures_stdout() {
    let outcome = sh().run("echo hello").await;
    assert_eq!(
        outcome,
        ExecutionOutcome::Output {
            stdout: "hello\n".into(),
            truncated: false
        }
    );
}

#[tokio::test]
async fn silent_success_is_no_output() {
    assert_eq!(sh().run("x=1").await, ExecutionOutcome::NoOutput);
}

#[tokio::test]
async fn whitespace_only_output_is_still_output() {
    assert_eq!(
        sh().run("echo").await,
        ExecutionOutcome::Output {
            stdout: "\n".into(),
            truncated: false
        }
    );
}

#[tokio::test]
async fn failure_is_returned_with_detail() {
    let outcome = sh().run("echo boom >&2; exit 3").await;
    match outcome {
        ExecutionOutcome::Failed { detail } => assert_eq!(detail, "boom"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn failure_without_stderr_reports_exit_status() {
    let outcome = sh().run("exit 4").await;
    match outcome {
        ExecutionOutcome::Failed { detail } => assert!(detail.contains('4'), "got {detail}"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn long_running_code_times_out() {
    let sandbox = sh().with_timeout(Duration::from_millis(300));
    let outcome = sandbox.run("sleep 5").await;
    assert_eq!(
        outcome,
        ExecutionOutcome::TimedOut {
            limit: Duration::from_millis(300)
        }
    );
}

#[tokio::test]
async fn background_process_does_not_hold_up_finished_run() {
    let sandbox = sh().with_timeout(Duration::from_secs(3));
    let started = std::time::Instant::now();
    let outcome = sandbox.run("sleep 7 & echo hi").await;
    assert_eq!(
        outcome,
        ExecutionOutcome::Output {
            stdout: "hi\n".into(),
            truncated: false
        }
    );
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[cfg(target_os = "linux")]
fn is_running(pid: &str) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        // Zombies only wait to be reaped.
        Ok(stat) => !stat
            .rsplit(')')
            .next()
            .is_some_and(|rest| rest.trim_start().starts_with('Z')),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn background_process_is_killed_with_the_run() {
    let outcome = sh().run("sleep 30 & echo $!").await;
    let pid = match outcome {
        ExecutionOutcome::Output { stdout, .. } => stdout.trim().to_string(),
        other => panic!("expected output, got {other:?}"),
    };

    let mut alive = true;
    for _ in 0..20 {
        alive = is_running(&pid);
        if !alive {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(!alive, "sleep {pid} outlived the run");
}

#[tokio::test]
async fn output_is_capped() {
    let sandbox = sh().with_max_output_bytes(1024);
    let code = "i=0; while [ $i -lt 500 ]; do echo 0123456789; i=$((i+1)); done";
    match sandbox.run(code).await {
        ExecutionOutcome::Output { stdout, truncated } => {
            assert!(truncated);
            assert_eq!(stdout.len(), 1024);
        }
        other => panic!("expected output, got {other:?}"),
    }
}

#[tokio::test]
async fn runs_inside_scratch_directory_with_cleared_env() {
    std::env::set_var("COLLOQUY_SANDBOX_TEST_SECRET", "leaked");
    let outcome = sh()
        .run(r#"pwd; echo "$HOME"; echo "${COLLOQUY_SANDBOX_TEST_SECRET:-unset}""#)
        .await;

    let ExecutionOutcome::Output { stdout, .. } = outcome else {
        panic!("expected output, got {outcome:?}");
    };
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].contains("colloquy-run-"), "cwd was {}", lines[0]);
    assert!(lines[1].contains("colloquy-run-"), "HOME was {}", lines[1]);
    assert_eq!(lines[2], "unset");
}

#[tokio::test]
async fn scratch_directory_is_removed_afterwards() {
    let outcome = sh().run("pwd").await;
    let ExecutionOutcome::Output { stdout, .. } = outcome else {
        panic!("expected output, got {outcome:?}");
    };
    assert!(!std::path::Path::new(stdout.trim()).exists());
}

#[tokio::test]
async fn missing_interpreter_binary_is_a_failure() {
    let sandbox = ExecutionSandbox::new("/nonexistent/bin/python3", Vec::new()).unwrap();
    match sandbox.run("print(1)").await {
        ExecutionOutcome::Failed { detail } => {
            assert!(detail.contains("failed to start interpreter"), "got {detail}")
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn code_executor_returns_text_not_errors() {
    let executor = CodeExecutor::new(sh());
    let text = executor.execute("echo oops >&2; exit 1").await;
    assert_eq!(text, "Error while executing code:\noops");

    let text = executor.execute("echo 4").await;
    assert_eq!(text, "Output:\n4\n");
}
