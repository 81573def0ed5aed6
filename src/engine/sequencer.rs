// src/engine/sequencer.rs

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::event::RunEvent;
use crate::exec::{self, Operation};

/// One named unit of a compound workflow.
#[derive(Debug, Clone)]
pub struct Step {
    pub label: String,
    pub operation: Operation,
}

impl Step {
    pub fn new(label: impl Into<String>, operation: Operation) -> Self {
        Self {
            label: label.into(),
            operation,
        }
    }
}

/// An ordered list of steps executed strictly in declaration order with
/// fail-fast semantics, plus an optional cleanup step.
///
/// The cleanup step runs on both paths: after the last step on success
/// (its exit code becomes the workflow code), and best-effort after a
/// failure (the failing step's code stays authoritative).
#[derive(Debug, Clone)]
pub struct Workflow {
    pub steps: Vec<Step>,
    pub cleanup: Option<Step>,
}

impl Workflow {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            cleanup: None,
        }
    }

    pub fn with_cleanup(mut self, step: Step) -> Self {
        self.cleanup = Some(step);
        self
    }
}

/// Aggregate outcome of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowResult {
    /// Index of the last step attempted (the cleanup step is not counted).
    pub last_step: usize,
    /// Final code: the first failing step's code (-1 for spawn failures),
    /// otherwise the code of the cleanup/last step.
    pub code: i32,
}

/// Outcome of a single step, before it is folded into the workflow result.
#[derive(Debug, Clone)]
enum StepOutcome {
    Exit(i32),
    Error(String),
}

impl StepOutcome {
    fn code(&self) -> i32 {
        match self {
            StepOutcome::Exit(code) => *code,
            StepOutcome::Error(_) => -1,
        }
    }

    fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Exit(0))
    }
}

/// Run a workflow in the background and return the receiving end of its
/// event stream.
pub fn spawn_workflow(workflow: Workflow) -> mpsc::Receiver<RunEvent> {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(async move {
        run_workflow(workflow, tx).await;
    });
    rx
}

/// Run the steps strictly in order, forwarding their output into `tx`.
///
/// Each step is announced with a `StepStarted` marker before its operation
/// runs; a step never starts before its predecessor has terminated.
/// Per-step terminal events are absorbed; the workflow emits exactly one
/// terminal event, always last. A step exiting non-zero (or failing to
/// spawn) stops the sequence and later steps never start.
pub async fn run_workflow(workflow: Workflow, tx: mpsc::Sender<RunEvent>) -> WorkflowResult {
    let mut last_step = 0;
    let mut failure: Option<StepOutcome> = None;

    for (index, step) in workflow.steps.into_iter().enumerate() {
        last_step = index;
        info!(step = %step.label, index, "starting workflow step");

        let outcome = run_step(step, &tx).await;
        if !outcome.is_success() {
            warn!(
                index,
                code = outcome.code(),
                "workflow step failed; skipping remaining steps"
            );
            failure = Some(outcome);
            break;
        }
    }

    let mut final_outcome = failure.clone().unwrap_or(StepOutcome::Exit(0));

    if let Some(cleanup) = workflow.cleanup {
        info!(step = %cleanup.label, "running workflow cleanup step");
        let outcome = run_step(cleanup, &tx).await;

        match &failure {
            Some(_) => {
                // Cleanup after a failure is best-effort; the first failing
                // step's code stays authoritative.
                if !outcome.is_success() {
                    warn!(
                        code = outcome.code(),
                        "cleanup step failed after an earlier failure"
                    );
                }
            }
            None => final_outcome = outcome,
        }
    }

    let terminal = match &final_outcome {
        StepOutcome::Exit(code) => RunEvent::Completed { code: *code },
        StepOutcome::Error(message) => RunEvent::Failed {
            message: message.clone(),
        },
    };
    let _ = tx.send(terminal).await;

    let result = WorkflowResult {
        last_step,
        code: final_outcome.code(),
    };
    debug!(?result, "workflow finished");
    result
}

/// Run one step: emit its marker, forward its output, return its outcome.
async fn run_step(step: Step, tx: &mpsc::Sender<RunEvent>) -> StepOutcome {
    let _ = tx
        .send(RunEvent::StepStarted {
            label: step.label.clone(),
        })
        .await;

    let mut events = exec::spawn_operation(step.operation);
    let mut outcome = StepOutcome::Error(format!(
        "step '{}' produced no terminal event",
        step.label
    ));

    while let Some(event) = events.recv().await {
        match event {
            RunEvent::Completed { code } => outcome = StepOutcome::Exit(code),
            RunEvent::Failed { message } => outcome = StepOutcome::Error(message),
            other => {
                if tx.send(other).await.is_err() {
                    // Consumer is gone. Dropping `events` closes the inner
                    // channel, which makes the runner kill the child.
                    debug!(step = %step.label, "stream consumer gone; abandoning step");
                    return StepOutcome::Error("stream consumer disconnected".to_string());
                }
            }
        }
    }

    outcome
}
