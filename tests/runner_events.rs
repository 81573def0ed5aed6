use std::error::Error;

use opsdeck::engine::{Origin, RunEvent};
use opsdeck::exec::{self, Operation};

type TestResult = Result<(), Box<dyn Error>>;

/// Drive an operation to completion and collect every event.
async fn collect(operation: Operation) -> Vec<RunEvent> {
    let mut rx = exec::spawn_operation(operation);
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn gathered_output(events: &[RunEvent], origin: Origin) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            RunEvent::OutputChunk { origin: o, text } if *o == origin => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn successful_exit_yields_single_done_zero() -> TestResult {
    let events = collect(Operation::shell("printf a; printf b 1>&2; exit 0")).await;

    assert_eq!(events.last(), Some(&RunEvent::Completed { code: 0 }));
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, RunEvent::Failed { .. }))
    );

    assert_eq!(gathered_output(&events, Origin::Stdout), "a");
    assert_eq!(gathered_output(&events, Origin::Stderr), "b");
    Ok(())
}

#[tokio::test]
async fn nonzero_exit_is_done_not_error() -> TestResult {
    let events = collect(Operation::shell("exit 7")).await;

    assert_eq!(events.last(), Some(&RunEvent::Completed { code: 7 }));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, RunEvent::Failed { .. }))
    );
    Ok(())
}

#[tokio::test]
async fn spawn_failure_yields_failed_event() -> TestResult {
    let events = collect(Operation::new("/nonexistent/opsdeck-test-binary")).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], RunEvent::Failed { message } if !message.is_empty()));
    Ok(())
}

#[tokio::test]
async fn env_override_applies_to_child_only() -> TestResult {
    let operation =
        Operation::shell("printf \"$OPSDECK_TEST_VAR\"").env("OPSDECK_TEST_VAR", "from-override");
    let events = collect(operation).await;

    assert_eq!(gathered_output(&events, Origin::Stdout), "from-override");
    // The parent process environment is untouched.
    assert!(std::env::var("OPSDECK_TEST_VAR").is_err());
    Ok(())
}

#[tokio::test]
async fn cleared_variable_is_absent_in_child() -> TestResult {
    // Prints "unset" when HOME is missing from the child environment; also
    // passes when the test environment never had HOME to begin with.
    let operation = Operation::shell("printf \"${HOME-unset}\"").env_remove("HOME");
    let events = collect(operation).await;

    assert_eq!(gathered_output(&events, Origin::Stdout), "unset");
    Ok(())
}

#[tokio::test]
async fn chunks_on_one_pipe_preserve_write_order() -> TestResult {
    let events = collect(Operation::shell("printf one; sleep 0.05; printf two")).await;

    assert_eq!(gathered_output(&events, Origin::Stdout), "onetwo");
    assert_eq!(events.last(), Some(&RunEvent::Completed { code: 0 }));
    Ok(())
}

#[tokio::test]
async fn terminal_event_is_always_last() -> TestResult {
    let events = collect(Operation::shell("echo hi; echo err 1>&2")).await;

    let terminal_positions: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_terminal())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(terminal_positions, vec![events.len() - 1]);
    Ok(())
}

#[tokio::test]
async fn working_directory_is_respected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let events = collect(Operation::shell("pwd").current_dir(dir.path())).await;

    let reported = gathered_output(&events, Origin::Stdout);
    let reported = std::fs::canonicalize(reported.trim())?;
    assert_eq!(reported, std::fs::canonicalize(dir.path())?);
    Ok(())
}

#[tokio::test]
async fn direct_invocation_passes_args_unmodified() -> TestResult {
    let events = collect(Operation::new("printf").arg("%s-%s").args(["a", "b"])).await;

    assert_eq!(gathered_output(&events, Origin::Stdout), "a-b");
    assert_eq!(events.last(), Some(&RunEvent::Completed { code: 0 }));
    Ok(())
}
